mod gate;
mod node;
mod scheduler;

pub use gate::{Gate, Occupancy, SlotConflict, TimeSlot};
pub use node::AirportNode;
pub use scheduler::{AirportError, AirportScheduler};

#[cfg(test)]
mod test {
    use std::net::SocketAddr;

    use schema::Service;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    async fn start(id: i32, gates: usize) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let node = AirportNode::new(id, AirportScheduler::new(gates).expect("airport"));
        tokio::spawn(Service::new(node).with_workers(4).run(listener));
        addr
    }

    async fn exchange(addr: SocketAddr, request: impl AsRef<[u8]>) -> String {
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream.write_all(request.as_ref()).await.expect("write");
        let mut response = String::new();
        stream.read_to_string(&mut response).await.expect("read");
        response
    }

    #[tokio::test]
    async fn test_requests_share_one_connection() {
        let addr = start(3, 1).await;

        let response = exchange(
            addr,
            "SCHEDULE 3 7 4 2 0\nPLANE_STATUS 3 7\nBOGUS\nTIME_STATUS 3 0 6 1\n\n",
        )
        .await;

        assert_eq!(
            response,
            "SCHEDULED 7 at GATE 0: 02:00-03:00\n\
             PLANE 7 scheduled at GATE 0: 02:00-03:00\n\
             Error: Invalid request provided\n\
             AIRPORT 3 GATE 0 03:00: A - 7\n\
             AIRPORT 3 GATE 0 03:30: F - 0\n"
        );
    }

    #[tokio::test]
    async fn test_garbled_line_keeps_connection_open() {
        let addr = start(0, 1).await;

        let response = exchange(addr, b"SCHEDULE 0 7 4 2 0\n\xff\xfe\nPLANE_STATUS 0 7\n\n").await;

        assert_eq!(
            response,
            "SCHEDULED 7 at GATE 0: 02:00-03:00\n\
             Error: Invalid request provided\n\
             PLANE 7 scheduled at GATE 0: 02:00-03:00\n"
        );
    }

    #[tokio::test]
    async fn test_state_survives_connections() {
        let addr = start(0, 1).await;

        exchange(addr, "SCHEDULE 0 11 20 3 0\n\n").await;

        assert_eq!(
            exchange(addr, "SCHEDULE 0 12 20 3 0\n\n").await,
            "Error: Cannot schedule 12\n"
        );
        assert_eq!(
            exchange(addr, "PLANE_STATUS 0 11\n\n").await,
            "PLANE 11 scheduled at GATE 0: 10:00-11:30\n"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_clients_never_double_book() {
        let addr = start(0, 1).await;

        let requests = (1..=20)
            .map(|plane| format!("SCHEDULE 0 {plane} 0 5 42\n\n"))
            .collect::<Vec<_>>();
        let responses =
            futures::future::join_all(requests.iter().map(|request| exchange(addr, request)))
                .await;

        // 48 slots fit exactly eight six-slot stays
        let scheduled = responses
            .iter()
            .filter(|response| response.starts_with("SCHEDULED"))
            .count();
        assert_eq!(scheduled, 8);

        let status = exchange(addr, "TIME_STATUS 0 0 0 47\n\n").await;
        let mut occupied = status.lines().filter(|line| line.contains(": A - "));
        assert_eq!(occupied.clone().count(), 48);
        assert!(occupied.all(|line| !line.ends_with(" - 0")));
    }
}
