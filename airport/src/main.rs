use std::net::SocketAddr;

use clap::Parser;
use schema::{Service, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
use tokio::net::TcpListener;

use airport::{AirportNode, AirportScheduler};

/// A single airport node of the air-traffic-control network
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Identifier of this airport
    #[arg(long, env = "AIRPORT_ID")]
    id: i32,
    /// Number of gates at this airport
    #[arg(long, env = "AIRPORT_GATES")]
    gates: usize,
    /// Address to accept controller connections on
    #[arg(long, env = "AIRPORT_SOCKET", default_value = "127.0.0.1:1025")]
    listen: SocketAddr,
    /// Number of workers serving connections
    #[arg(long, env = "ATC_WORKERS", default_value_t = DEFAULT_WORKERS)]
    workers: usize,
    /// Accepted connections held while every worker is busy
    #[arg(long, env = "ATC_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let scheduler = AirportScheduler::new(args.gates)?;
    let node = AirportNode::new(args.id, scheduler);
    let listener = TcpListener::bind(args.listen).await?;

    log::info!(
        "airport {} running with {} gates on {}",
        node.id(),
        args.gates,
        args.listen
    );

    Service::new(node)
        .with_workers(args.workers)
        .with_queue_capacity(args.queue_capacity)
        .run_until(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for ctrl-c: {}", e);
            }
        })
        .await;

    log::info!("airport {} stopped", args.id);

    Ok(())
}
