use std::fmt;

use crate::NUM_TIME_SLOTS;

/// Identifier of an airport node, as carried on the wire
pub type AirportId = i32;

/// Identifier of a plane, as carried on the wire
pub type PlaneId = i32;

/// A slot index rendered as the wall-clock time at which it begins (`HH:MM`)
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotTime(pub usize);

impl SlotTime {
    pub fn hour(&self) -> usize {
        self.0 >> 1
    }

    pub fn minutes(&self) -> usize {
        if self.0 & 1 == 1 {
            30
        } else {
            0
        }
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minutes())
    }
}

/// Where and when a plane sits at a gate.
/// `start` and `end` are inclusive slot indices.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeInfo {
    pub gate: usize,
    pub start: usize,
    pub end: usize,
}

impl TimeInfo {
    /// Number of slots covered by this assignment
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Returns true if this assignment covers `slot`
    pub fn covers(&self, slot: usize) -> bool {
        (self.start..=self.end).contains(&slot)
    }

    /// Returns true if both assignments share a gate and at least one slot
    pub fn overlaps(&self, other: &Self) -> bool {
        self.gate == other.gate && self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for TimeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GATE {}: {}-{}",
            self.gate,
            SlotTime(self.start),
            SlotTime(self.end)
        )
    }
}

/// Occupancy of a single slot as reported by `TIME_STATUS`
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotStatus {
    #[default]
    Free,
    Assigned(PlaneId),
}

impl SlotStatus {
    /// `A` for an assigned slot, `F` for a free one
    pub fn code(&self) -> char {
        match self {
            Self::Free => 'F',
            Self::Assigned(_) => 'A',
        }
    }

    /// The occupying plane, or `0` for a free slot
    pub fn plane(&self) -> PlaneId {
        match self {
            Self::Free => 0,
            Self::Assigned(plane) => *plane,
        }
    }
}

/// Returns true if `slot` is a valid index into a gate's schedule
pub fn is_valid_slot(slot: i64) -> bool {
    (0..NUM_TIME_SLOTS as i64).contains(&slot)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slot_time_formatting() {
        assert_eq!(SlotTime(0).to_string(), "00:00");
        assert_eq!(SlotTime(1).to_string(), "00:30");
        assert_eq!(SlotTime(4).to_string(), "02:00");
        assert_eq!(SlotTime(6).to_string(), "03:00");
        assert_eq!(SlotTime(47).to_string(), "23:30");
    }

    #[test]
    fn test_time_info_overlap() {
        let a = TimeInfo { gate: 0, start: 4, end: 6 };

        assert!(a.overlaps(&TimeInfo { gate: 0, start: 6, end: 9 }));
        assert!(a.overlaps(&TimeInfo { gate: 0, start: 0, end: 4 }));
        assert!(!a.overlaps(&TimeInfo { gate: 0, start: 7, end: 9 }));
        assert!(!a.overlaps(&TimeInfo { gate: 1, start: 4, end: 6 }));
        assert_eq!(a.len(), 3);
        assert_eq!(a.to_string(), "GATE 0: 02:00-03:00");
    }

    #[test]
    fn test_slot_status() {
        assert_eq!(SlotStatus::Free.code(), 'F');
        assert_eq!(SlotStatus::Free.plane(), 0);
        assert_eq!(SlotStatus::Assigned(12).code(), 'A');
        assert_eq!(SlotStatus::Assigned(12).plane(), 12);
    }
}
