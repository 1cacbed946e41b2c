use std::fmt;
use std::str::FromStr;

use crate::{AirportId, PlaneId, RequestError};

/// A single line of the scheduling protocol, checked for shape only:
/// a known command followed by the right number of integer arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    /// `SCHEDULE <airport> <plane> <earliest> <duration> <fuel>`
    Schedule {
        airport: AirportId,
        plane: PlaneId,
        earliest: i32,
        duration: i32,
        fuel: i32,
    },
    /// `PLANE_STATUS <airport> <plane>`
    PlaneStatus { airport: AirportId, plane: PlaneId },
    /// `TIME_STATUS <airport> <gate> <start> <duration>`
    TimeStatus {
        airport: AirportId,
        gate: i32,
        start: i32,
        duration: i32,
    },
}

impl Request {
    pub const SCHEDULE: &'static str = "SCHEDULE";
    pub const PLANE_STATUS: &'static str = "PLANE_STATUS";
    pub const TIME_STATUS: &'static str = "TIME_STATUS";

    /// The airport this request is addressed to
    pub fn airport(&self) -> AirportId {
        match self {
            Self::Schedule { airport, .. }
            | Self::PlaneStatus { airport, .. }
            | Self::TimeStatus { airport, .. } => *airport,
        }
    }

    /// Name of the command, as it appears on the wire
    pub fn command(&self) -> &'static str {
        match self {
            Self::Schedule { .. } => Self::SCHEDULE,
            Self::PlaneStatus { .. } => Self::PLANE_STATUS,
            Self::TimeStatus { .. } => Self::TIME_STATUS,
        }
    }
}

impl FromStr for Request {
    type Err = RequestError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let command = tokens.next().ok_or(RequestError::InvalidRequest)?;
        let args = tokens
            .map(|token| token.parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| RequestError::InvalidRequest)?;

        match (command, args.as_slice()) {
            (Self::SCHEDULE, &[airport, plane, earliest, duration, fuel]) => Ok(Self::Schedule {
                airport,
                plane,
                earliest,
                duration,
                fuel,
            }),
            (Self::PLANE_STATUS, &[airport, plane]) => Ok(Self::PlaneStatus { airport, plane }),
            (Self::TIME_STATUS, &[airport, gate, start, duration]) => Ok(Self::TimeStatus {
                airport,
                gate,
                start,
                duration,
            }),
            _ => Err(RequestError::InvalidRequest),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schedule {
                airport,
                plane,
                earliest,
                duration,
                fuel,
            } => write!(
                f,
                "{} {airport} {plane} {earliest} {duration} {fuel}",
                Self::SCHEDULE
            ),
            Self::PlaneStatus { airport, plane } => {
                write!(f, "{} {airport} {plane}", Self::PLANE_STATUS)
            }
            Self::TimeStatus {
                airport,
                gate,
                start,
                duration,
            } => write!(
                f,
                "{} {airport} {gate} {start} {duration}",
                Self::TIME_STATUS
            ),
        }
    }
}
