use std::sync::Mutex;

use crate::id::ReservationId;

use super::reservation_holdings::ReservationHoldings;
use super::reservation_list::ReservationList;

/// Per-upstream-source reservation state on a broker. Not standalone: owned
/// by a `BrokerCalendar` keyed by the source reservation's id. `outlays`
/// tracks child allocations drawn from this source; `extending` tracks
/// incoming extension requests against it, keyed by the cycle they're due.
#[derive(Debug, Default)]
pub struct SourceCalendar {
    outlays: Mutex<ReservationHoldings>,
    extending: Mutex<ReservationList>,
}

impl SourceCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_outlay(&self, reservation: ReservationId, start_ms: i64, end_ms: i64, resource_type: Option<String>) -> crate::error::Result<()> {
        self.outlays.lock().unwrap().add(reservation, start_ms, end_ms, resource_type)
    }

    pub fn remove_outlay(&self, reservation: ReservationId) {
        self.outlays.lock().unwrap().remove(reservation);
    }

    pub fn outlays_at(&self, time_ms: i64) -> std::collections::HashSet<ReservationId> {
        self.outlays.lock().unwrap().get(time_ms, None)
    }

    pub fn add_extending(&self, reservation: ReservationId, cycle: i64) {
        self.extending.lock().unwrap().add(reservation, cycle);
    }

    pub fn extending_at(&self, cycle: i64) -> std::collections::HashSet<ReservationId> {
        self.extending.lock().unwrap().get(cycle)
    }

    pub fn tick(&self, cycle: i64, cutoff_ms: i64) {
        self.outlays.lock().unwrap().tick(cutoff_ms);
        self.extending.lock().unwrap().tick(cycle);
    }
}
