use crate::{PlaneId, SlotStatus, TimeInfo};

/// A gate scheduler for a single airport.
///
/// Implementations are shared between the workers of a node, so every
/// operation takes `&self` and must be safe to call concurrently. Two
/// concurrent `schedule` calls must never leave overlapping ranges on the
/// same gate.
pub trait Scheduler: Send + Sync {
    /// Number of gates managed by this scheduler
    fn num_gates(&self) -> usize;

    /// Assign `plane` to the first gate with a free range of `duration + 1`
    /// slots starting somewhere in `[earliest, earliest + fuel]`.
    /// Callers validate that `earliest + duration` fits in the day.
    fn schedule(
        &self,
        plane: PlaneId,
        earliest: usize,
        duration: usize,
        fuel: usize,
    ) -> Option<TimeInfo>;

    /// Returns the first assignment of `plane`, searching gates in order
    fn lookup(&self, plane: PlaneId) -> Option<TimeInfo>;

    /// Returns the status of the slots `[start, end]` of `gate`, or `None` if
    /// the gate or range is out of bounds
    fn gate_status(&self, gate: usize, start: usize, end: usize) -> Option<Vec<SlotStatus>>;
}
