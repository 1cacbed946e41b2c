use std::fmt;

use crate::{AirportId, PlaneId, SlotStatus, SlotTime, TimeInfo};

/// A successful reply from an airport node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    Scheduled {
        plane: PlaneId,
        info: TimeInfo,
    },
    PlaneScheduled {
        plane: PlaneId,
        info: TimeInfo,
    },
    PlaneNotScheduled {
        plane: PlaneId,
        airport: AirportId,
    },
    /// One entry per slot, starting at slot index `start`
    TimeStatus {
        airport: AirportId,
        gate: usize,
        start: usize,
        slots: Vec<SlotStatus>,
    },
}

impl fmt::Display for Response {
    /// Renders the full reply, every line terminated by `\n`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduled { plane, info } => writeln!(f, "SCHEDULED {plane} at {info}"),
            Self::PlaneScheduled { plane, info } => {
                writeln!(f, "PLANE {plane} scheduled at {info}")
            }
            Self::PlaneNotScheduled { plane, airport } => {
                writeln!(f, "PLANE {plane} not scheduled at airport {airport}")
            }
            Self::TimeStatus {
                airport,
                gate,
                start,
                slots,
            } => {
                for (slot, status) in (*start..).zip(slots) {
                    writeln!(
                        f,
                        "AIRPORT {airport} GATE {gate} {}: {} - {}",
                        SlotTime(slot),
                        status.code(),
                        status.plane()
                    )?;
                }
                Ok(())
            }
        }
    }
}
