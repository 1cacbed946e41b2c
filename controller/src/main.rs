use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use schema::{Service, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
use tokio::net::TcpListener;

use controller::{wait_until_listening, Fleet, NetworkConfig, Router, MIN_PORT};

/// Starts an air-traffic-control network: one controller routing requests to
/// a process per airport
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Number of airports to create
    #[arg(short = 'n', long = "airports")]
    airports: usize,
    /// Port number to use for the controller; airports take the ports after it
    #[arg(short, long, env = "ATC_CONTROLLER_PORT", default_value_t = MIN_PORT)]
    port: u16,
    /// Address every service binds to
    #[arg(long, env = "ATC_HOST", default_value = "127.0.0.1")]
    host: IpAddr,
    /// Number of workers serving client connections
    #[arg(long, env = "ATC_WORKERS", default_value_t = DEFAULT_WORKERS)]
    workers: usize,
    /// Accepted connections held while every worker is busy
    #[arg(long, env = "ATC_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,
    /// Path to the airport executable (defaults to the one next to this binary)
    #[arg(long, env = "ATC_AIRPORT_BIN")]
    airport_bin: Option<PathBuf>,
    /// Seconds to wait for every airport to start listening
    #[arg(long, default_value_t = 5)]
    startup_timeout: u64,
    /// Number of gates at each airport, e.g. `2,3,1` or `2 3 1`
    #[arg(last = true, value_delimiter = ',', num_args = 1..)]
    gate_counts: Vec<String>,
}

/// Splits the gate count list on commas and whitespace
fn parse_gate_counts(values: &[String]) -> Result<Vec<usize>, std::num::ParseIntError> {
    values
        .iter()
        .flat_map(|value| value.split_whitespace())
        .map(str::parse)
        .collect()
}

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let gate_counts = parse_gate_counts(&args.gate_counts)?;
    let config = NetworkConfig::new(args.host, args.port, args.airports, gate_counts)?;

    let airport_bin = match args.airport_bin {
        Some(path) => path,
        None => std::env::current_exe()?
            .with_file_name(format!("airport{}", std::env::consts::EXE_SUFFIX)),
    };

    // Bind before spawning so the controller's port is never handed to a node
    let listener = TcpListener::bind(config.controller_addr()).await?;
    let registry = config.registry();
    let fleet = Fleet::launch(&config, &airport_bin);
    log::info!(
        "started {} of {} airports",
        fleet.len(),
        config.num_airports()
    );

    wait_until_listening(&registry, Duration::from_secs(args.startup_timeout)).await;

    log::info!("controller running on {}", config.controller_addr());

    let service = Service::new(Router::new(registry))
        .with_workers(args.workers)
        .with_queue_capacity(args.queue_capacity);

    let reaper = tokio::spawn(fleet.reap());
    service
        .run_until(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("failed to listen for ctrl-c: {}", e);
            }
        })
        .await;

    // Dropping the unfinished reaper kills the airports
    reaper.abort();
    log::info!("controller stopped");

    Ok(())
}
