use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use schema::{Request, RequestError, RequestHandler};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::Registry;

/// Forwards each request to the airport it names and relays the reply.
///
/// Requests are only checked for shape here; the airport node owns every
/// other validation.
pub struct Router {
    registry: Registry,
}

impl Router {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Sends `line` to the node at `addr` over a fresh connection and copies
    /// the node's reply to `out` until the node closes the connection.
    /// Failing to reach the node skips the request.
    async fn forward(
        &self,
        addr: SocketAddr,
        line: &str,
        out: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> io::Result<()> {
        let mut node = match TcpStream::connect(addr).await {
            Ok(node) => node,
            Err(e) => {
                log::warn!("could not connect to airport at {}: {}", addr, e);
                return Ok(());
            }
        };

        if let Err(e) = node.write_all(format!("{line}\n\n").as_bytes()).await {
            log::warn!("could not send request to airport at {}: {}", addr, e);
            return Ok(());
        }

        let mut reply = BufReader::new(node);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reply.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => out.write_all(&buf).await?,
                Err(e) => {
                    log::warn!("lost connection to airport at {}: {}", addr, e);
                    break;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RequestHandler for Router {
    async fn respond(
        &self,
        line: &str,
        out: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> io::Result<()> {
        let request = match line.parse::<Request>() {
            Ok(request) => request,
            Err(e) => return out.write_all(e.to_response().as_bytes()).await,
        };

        match self.registry.address(request.airport()) {
            Some(addr) => {
                log::debug!(
                    "routing {} to airport {} at {}",
                    request.command(),
                    request.airport(),
                    addr
                );
                self.forward(addr, line, out).await
            }
            None => {
                let error = RequestError::AirportNotFound(request.airport());
                out.write_all(error.to_response().as_bytes()).await
            }
        }
    }
}

#[cfg(test)]
mod test {
    use airport::{AirportNode, AirportScheduler};
    use schema::Service;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    use super::*;

    async fn start_airport(id: i32, gates: usize) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let node = AirportNode::new(id, AirportScheduler::new(gates).expect("airport"));
        tokio::spawn(Service::new(node).with_workers(2).run(listener));
        addr
    }

    async fn start_controller(registry: Registry) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(Service::new(Router::new(registry)).with_workers(2).run(listener));
        addr
    }

    async fn unused_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        listener.local_addr().expect("addr")
    }

    async fn exchange(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream.write_all(request.as_bytes()).await.expect("write");
        let mut response = String::new();
        stream.read_to_string(&mut response).await.expect("read");
        response
    }

    #[tokio::test]
    async fn test_routes_to_each_airport() {
        let registry = Registry::new(vec![start_airport(0, 1).await, start_airport(1, 2).await]);
        let controller = start_controller(registry).await;

        let response = exchange(
            controller,
            "SCHEDULE 0 7 4 2 0\n\
             SCHEDULE 1 7 4 2 0\n\
             SCHEDULE 0 8 4 2 0\n\
             SCHEDULE 1 8 4 2 0\n\
             PLANE_STATUS 1 8\n\
             TIME_STATUS 0 0 3 1\n\n",
        )
        .await;

        assert_eq!(
            response,
            "SCHEDULED 7 at GATE 0: 02:00-03:00\n\
             SCHEDULED 7 at GATE 0: 02:00-03:00\n\
             Error: Cannot schedule 8\n\
             SCHEDULED 8 at GATE 1: 02:00-03:00\n\
             PLANE 8 scheduled at GATE 1: 02:00-03:00\n\
             AIRPORT 0 GATE 0 01:30: F - 0\n\
             AIRPORT 0 GATE 0 02:00: A - 7\n"
        );
    }

    #[tokio::test]
    async fn test_reports_unknown_airport() {
        let registry = Registry::new(vec![start_airport(0, 1).await]);
        let controller = start_controller(registry).await;

        let response = exchange(
            controller,
            "PLANE_STATUS 1 7\nPLANE_STATUS -4 7\nPLANE_STATUS 0 7\n\n",
        )
        .await;

        assert_eq!(
            response,
            "Error: Airport 1 does not exist\n\
             Error: Airport -4 does not exist\n\
             PLANE 7 not scheduled at airport 0\n"
        );
    }

    #[tokio::test]
    async fn test_checks_shape_only() {
        let registry = Registry::new(vec![start_airport(0, 1).await]);
        let controller = start_controller(registry).await;

        let response = exchange(
            controller,
            "SCHEDULE 0 1 2\nDEPART 0 1\nSCHEDULE 0 7 60 2 0\n\n",
        )
        .await;

        // The node, not the controller, rejects the out-of-range time
        assert_eq!(
            response,
            "Error: Invalid request provided\n\
             Error: Invalid request provided\n\
             Error: Invalid 'earliest' time (60)\n"
        );
    }

    #[tokio::test]
    async fn test_skips_unreachable_airport() {
        let registry = Registry::new(vec![unused_addr().await]);
        let controller = start_controller(registry).await;

        let response = exchange(controller, "PLANE_STATUS 0 7\nPLANE_STATUS 3 7\n\n").await;

        assert_eq!(response, "Error: Airport 3 does not exist\n");
    }

    #[tokio::test]
    async fn test_node_checks_its_own_id() {
        // Airport 1's address registered under id 0
        let registry = Registry::new(vec![start_airport(1, 1).await]);
        let controller = start_controller(registry).await;

        let response = exchange(controller, "PLANE_STATUS 0 7\n\n").await;

        assert_eq!(
            response,
            "Error: Airport 0 is not served by this node (airport 1)\n"
        );
    }
}
