use std::sync::Mutex;

use crate::id::ReservationId;

use super::base::BaseCalendar;
use super::reservation_holdings::ReservationHoldings;
use super::reservation_list::ReservationList;

/// Superclass of the broker/controller calendar sides: tracks reservations
/// this actor holds (`holdings`) and reservations whose start cycle is still
/// pending (`pending`, keyed by start cycle).
///
/// Holds one coarse lock per sub-index rather than a single lock over the
/// whole façade, so a tick's prune of `holdings` never blocks a concurrent
/// read of `pending` from a management query thread; the lock is held only
/// for the duration of the index mutation itself, never across I/O.
#[derive(Debug)]
pub struct ClientCalendar {
    base: BaseCalendar,
    holdings: Mutex<ReservationHoldings>,
    pending: Mutex<ReservationList>,
}

impl ClientCalendar {
    pub fn new(base: BaseCalendar) -> Self {
        ClientCalendar { base, holdings: Mutex::new(ReservationHoldings::new()), pending: Mutex::new(ReservationList::new()) }
    }

    pub fn base(&self) -> &BaseCalendar {
        &self.base
    }

    pub fn add_holding(&self, reservation: ReservationId, start_ms: i64, end_ms: i64, resource_type: Option<String>) -> crate::error::Result<()> {
        self.holdings.lock().unwrap().add(reservation, start_ms, end_ms, resource_type)
    }

    pub fn remove_holding(&self, reservation: ReservationId) {
        self.holdings.lock().unwrap().remove(reservation);
    }

    pub fn holdings_at(&self, time_ms: i64) -> std::collections::HashSet<ReservationId> {
        self.holdings.lock().unwrap().get(time_ms, None)
    }

    pub fn add_pending(&self, reservation: ReservationId, start_cycle: i64) {
        self.pending.lock().unwrap().add(reservation, start_cycle);
    }

    pub fn remove_pending(&self, reservation: ReservationId) {
        self.pending.lock().unwrap().remove(reservation);
    }

    pub fn pending_at(&self, cycle: i64) -> std::collections::HashSet<ReservationId> {
        self.pending.lock().unwrap().get(cycle)
    }

    /// Advances both sub-indices to `cycle`: prunes `holdings` to the
    /// cycle's end millisecond and erases `pending` entries up to `cycle`.
    pub fn tick(&self, cycle: i64) {
        let cutoff_ms = self.base.cycle_end_ms(cycle);
        self.holdings.lock().unwrap().tick(cutoff_ms);
        self.pending.lock().unwrap().tick(cycle);
    }
}
