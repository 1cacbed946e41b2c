use thiserror::Error;

use crate::{AirportId, PlaneId};

/// A request that could not be served. The `Display` form is the response
/// line sent back to the client (without the trailing newline).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Error: Invalid request provided")]
    InvalidRequest,

    #[error("Error: Invalid 'earliest' time ({0})")]
    InvalidEarliest(i32),

    #[error("Error: Invalid 'duration' value ({0})")]
    InvalidDuration(i32),

    #[error("Error: Invalid 'fuel' value ({0})")]
    InvalidFuel(i32),

    #[error("Error: Invalid 'gate' value ({0})")]
    InvalidGate(i32),

    #[error("Error: Invalid 'start' time ({0})")]
    InvalidStart(i32),

    #[error("Error: Cannot schedule {0}")]
    CannotSchedule(PlaneId),

    #[error("Error: Airport {0} does not exist")]
    AirportNotFound(AirportId),

    #[error("Error: Airport {requested} is not served by this node (airport {own})")]
    AirportMismatch {
        requested: AirportId,
        own: AirportId,
    },
}

impl RequestError {
    /// The response line sent back for this error
    pub fn to_response(&self) -> String {
        format!("{self}\n")
    }
}
