mod bootstrap;
mod registry;
mod router;

pub use bootstrap::{wait_until_listening, ConfigError, Fleet, NetworkConfig, MAX_PORT, MIN_PORT};
pub use registry::Registry;
pub use router::Router;
