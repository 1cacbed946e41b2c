use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use schema::AirportId;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};

use crate::Registry;

pub const MIN_PORT: u16 = 1024;
pub const MAX_PORT: u16 = 65535;

const PROBE_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("-n must be greater than 0.")]
    NoAirports,

    #[error("-p must be between {min}-{max}.")]
    PortOutOfRange { min: u16, max: u32 },

    #[error("Expected {expected} gate counts, got {got} instead.")]
    MissingGateCounts { expected: usize, got: usize },

    #[error("Airport {0} must have at least one gate.")]
    NoGates(usize),
}

/// Layout of the network: the controller listens on `port`, airport `i` on
/// `port + 1 + i`, all on `host`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub host: IpAddr,
    pub port: u16,
    pub gate_counts: Vec<usize>,
}

impl NetworkConfig {
    /// Validates the layout for `airports` airports. Gate counts past the
    /// `airports`th are ignored.
    pub fn new(
        host: IpAddr,
        port: u16,
        airports: usize,
        mut gate_counts: Vec<usize>,
    ) -> Result<Self, ConfigError> {
        if airports == 0 {
            return Err(ConfigError::NoAirports);
        }

        let max = u32::from(MAX_PORT).saturating_sub(airports as u32);
        if port < MIN_PORT || u32::from(port) >= max {
            return Err(ConfigError::PortOutOfRange { min: MIN_PORT, max });
        }

        if gate_counts.len() < airports {
            return Err(ConfigError::MissingGateCounts {
                expected: airports,
                got: gate_counts.len(),
            });
        }
        if gate_counts.len() > airports {
            log::warn!(
                "ignoring {} extra gate counts",
                gate_counts.len() - airports
            );
            gate_counts.truncate(airports);
        }

        if let Some(airport) = gate_counts.iter().position(|gates| *gates == 0) {
            return Err(ConfigError::NoGates(airport));
        }

        Ok(Self {
            host,
            port,
            gate_counts,
        })
    }

    pub fn num_airports(&self) -> usize {
        self.gate_counts.len()
    }

    pub fn controller_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Address of airport `index`. The port fits since `new` checked the range.
    pub fn airport_addr(&self, index: usize) -> SocketAddr {
        SocketAddr::new(self.host, self.port + 1 + index as u16)
    }

    pub fn registry(&self) -> Registry {
        (0..self.num_airports())
            .map(|index| self.airport_addr(index))
            .collect()
    }
}

/// The airport processes spawned by the controller
#[derive(Debug, Default)]
pub struct Fleet {
    nodes: Vec<(AirportId, Child)>,
}

impl Fleet {
    /// Spawns one `airport_bin` process per airport. An airport that fails to
    /// start is logged and left out; its registry entry stays unreachable.
    pub fn launch(config: &NetworkConfig, airport_bin: &Path) -> Self {
        let mut nodes = vec![];

        for (id, (index, gates)) in (0..).zip(config.gate_counts.iter().enumerate()) {
            let addr = config.airport_addr(index);
            let spawned = Command::new(airport_bin)
                .arg("--id")
                .arg(id.to_string())
                .arg("--gates")
                .arg(gates.to_string())
                .arg("--listen")
                .arg(addr.to_string())
                .kill_on_drop(true)
                .spawn();

            match spawned {
                Ok(child) => {
                    log::info!(
                        "airport {} assigned {} (pid {})",
                        id,
                        addr,
                        child.id().unwrap_or_default()
                    );
                    nodes.push((id, child));
                }
                Err(e) => log::error!(
                    "failed to start airport {} from {}: {}",
                    id,
                    airport_bin.display(),
                    e
                ),
            }
        }

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Waits for every airport process to exit, logging how each one ended
    pub async fn reap(self) {
        let exits = self.nodes.into_iter().map(|(id, mut child)| async move {
            match child.wait().await {
                Ok(status) => log::warn!("airport {} exited: {}", id, status),
                Err(e) => log::error!("failed to wait for airport {}: {}", id, e),
            }
        });

        futures::future::join_all(exits).await;
    }
}

/// Waits until every node in `registry` accepts connections or `timeout`
/// elapses. Returns the ids of the nodes that never came up.
pub async fn wait_until_listening(registry: &Registry, timeout: Duration) -> Vec<AirportId> {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut unreachable = vec![];

    for (id, addr) in registry.iter() {
        loop {
            if TcpStream::connect(addr).await.is_ok() {
                log::debug!("airport {} is listening on {}", id, addr);
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                log::warn!("airport {} is not listening on {}", id, addr);
                unreachable.push(id);
                break;
            }
            tokio::time::sleep(PROBE_INTERVAL).await;
        }
    }

    unreachable
}
