use schema::{PlaneId, SlotStatus, NUM_TIME_SLOTS};
use thiserror::Error;

/// The contiguous run of slots a plane was assigned. Every slot in the run
/// stores the same `Occupancy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupancy {
    pub plane: PlaneId,
    /// Slot in which the plane arrives at the gate
    pub start: usize,
    /// Slot in which the plane leaves the gate
    pub end: usize,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSlot {
    occupant: Option<Occupancy>,
}

impl TimeSlot {
    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn occupant(&self) -> Option<&Occupancy> {
        self.occupant.as_ref()
    }

    pub fn status(&self) -> SlotStatus {
        match self.occupant {
            Some(occupancy) => SlotStatus::Assigned(occupancy.plane),
            None => SlotStatus::Free,
        }
    }

    fn claim(&mut self, occupancy: Occupancy) -> Result<(), Occupancy> {
        match self.occupant {
            Some(existing) => Err(existing),
            None => {
                self.occupant = Some(occupancy);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("slot {slot} is already assigned to plane {plane}")]
pub struct SlotConflict {
    pub slot: usize,
    pub plane: PlaneId,
}

/// A single gate's schedule for the day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gate {
    slots: [TimeSlot; NUM_TIME_SLOTS],
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            slots: [TimeSlot::default(); NUM_TIME_SLOTS],
        }
    }
}

impl Gate {
    pub fn slot(&self, slot: usize) -> Option<&TimeSlot> {
        self.slots.get(slot)
    }

    pub fn status(&self, slot: usize) -> Option<SlotStatus> {
        self.slot(slot).map(TimeSlot::status)
    }

    /// Returns true if every slot in `[start, end]` is unoccupied.
    /// A range that does not fit in the day is never free.
    pub fn is_range_free(&self, start: usize, end: usize) -> bool {
        start <= end
            && self
                .slots
                .get(start..=end)
                .map_or(false, |range| range.iter().all(TimeSlot::is_free))
    }

    /// Marks `[start, end]` as occupied by `plane`.
    ///
    /// Stops at the first slot that is already occupied and reports it; the
    /// slots claimed before it stay claimed. Call `is_range_free` first while
    /// holding the same borrow for an all-or-nothing claim.
    pub fn claim_range(
        &mut self,
        plane: PlaneId,
        start: usize,
        end: usize,
    ) -> Result<(), SlotConflict> {
        let occupancy = Occupancy { plane, start, end };
        for (slot, time_slot) in self
            .slots
            .iter_mut()
            .enumerate()
            .take(end + 1)
            .skip(start)
        {
            time_slot.claim(occupancy).map_err(|existing| SlotConflict {
                slot,
                plane: existing.plane,
            })?;
        }
        Ok(())
    }

    /// Returns the first slot assigned to `plane`.
    /// Assignments of other planes are skipped as a whole using their stored
    /// range end.
    pub fn find_plane(&self, plane: PlaneId) -> Option<usize> {
        let mut slot = 0;
        while let Some(time_slot) = self.slots.get(slot) {
            match time_slot.occupant {
                None => slot += 1,
                Some(occupancy) if occupancy.plane == plane => return Some(slot),
                Some(occupancy) => slot = occupancy.end.max(slot) + 1,
            }
        }
        None
    }

    /// First-fit search for a landing slot: tries every start in
    /// `[earliest, earliest + fuel]` in order and claims the first one whose
    /// `duration + 1` slots are all free. Returns the assigned start.
    pub fn assign(
        &mut self,
        plane: PlaneId,
        earliest: usize,
        duration: usize,
        fuel: usize,
    ) -> Option<usize> {
        let latest = earliest.saturating_add(fuel);
        let candidates = (earliest..=latest).take_while(|start| start + duration < NUM_TIME_SLOTS);

        for start in candidates {
            let end = start + duration;
            if !self.is_range_free(start, end) {
                continue;
            }

            match self.claim_range(plane, start, end) {
                Ok(()) => return Some(start),
                Err(conflict) => {
                    log::error!("partial claim for plane {}: {}", plane, conflict);
                    return None;
                }
            }
        }
        None
    }
}
