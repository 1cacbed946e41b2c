use std::sync::{Mutex, MutexGuard, PoisonError};

use schema::{PlaneId, Scheduler, SlotStatus, TimeInfo};
use thiserror::Error;

use crate::Gate;

#[derive(Debug, Error)]
pub enum AirportError {
    #[error("an airport needs at least one gate")]
    NoGates,
}

/// Gate scheduler for one airport.
///
/// Each gate sits behind its own lock, held for the whole check-then-claim of
/// an assignment. Two flights competing for the same gate are therefore
/// serialized, and the second always sees the first's slots as taken.
/// Flights landing at different gates proceed in parallel.
#[derive(Debug)]
pub struct AirportScheduler {
    gates: Vec<Mutex<Gate>>,
}

impl AirportScheduler {
    pub fn new(num_gates: usize) -> Result<Self, AirportError> {
        if num_gates == 0 {
            return Err(AirportError::NoGates);
        }

        Ok(Self {
            gates: (0..num_gates).map(|_| Mutex::new(Gate::default())).collect(),
        })
    }

    fn gate(&self, gate: usize) -> Option<MutexGuard<'_, Gate>> {
        self.gates
            .get(gate)
            .map(|gate| gate.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn gates(&self) -> impl Iterator<Item = (usize, MutexGuard<'_, Gate>)> + '_ {
        (0..self.gates.len()).filter_map(|index| self.gate(index).map(|gate| (index, gate)))
    }
}

impl Scheduler for AirportScheduler {
    fn num_gates(&self) -> usize {
        self.gates.len()
    }

    fn schedule(
        &self,
        plane: PlaneId,
        earliest: usize,
        duration: usize,
        fuel: usize,
    ) -> Option<TimeInfo> {
        // Lowest gate index wins
        self.gates().find_map(|(gate, mut slots)| {
            slots
                .assign(plane, earliest, duration, fuel)
                .map(|start| TimeInfo {
                    gate,
                    start,
                    end: start + duration,
                })
        })
    }

    fn lookup(&self, plane: PlaneId) -> Option<TimeInfo> {
        self.gates().find_map(|(gate, slots)| {
            let start = slots.find_plane(plane)?;
            let end = slots.slot(start)?.occupant()?.end;
            Some(TimeInfo { gate, start, end })
        })
    }

    fn gate_status(&self, gate: usize, start: usize, end: usize) -> Option<Vec<SlotStatus>> {
        let slots = self.gate(gate)?;
        (start..=end).map(|slot| slots.status(slot)).collect()
    }
}
