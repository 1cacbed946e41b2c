mod entities;
mod error;
mod queue;
mod request;
mod response;
mod scheduler;
mod service;

pub use entities::{is_valid_slot, AirportId, PlaneId, SlotStatus, SlotTime, TimeInfo};
pub use error::RequestError;
pub use queue::{WorkQueue, DEFAULT_QUEUE_CAPACITY};
pub use request::Request;
pub use response::Response;
pub use scheduler::Scheduler;
pub use service::{serve_connection, RequestHandler, Service, DEFAULT_WORKERS, MAX_LINE};

/// Each gate's day is broken up into 48 half-hour time slots
pub const NUM_TIME_SLOTS: usize = 48;
