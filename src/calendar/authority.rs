use std::sync::Mutex;

use crate::id::ReservationId;

use super::base::BaseCalendar;
use super::reservation_holdings::ReservationHoldings;
use super::reservation_list::ReservationList;

/// `BaseCalendar + requests + closing + outlays`. An authority admits or
/// denies `requests(c)`, tears down `closing(c)`, and prunes `outlays` to
/// the cycle's end millisecond on every tick.
#[derive(Debug)]
pub struct AuthorityCalendar {
    base: BaseCalendar,
    requests: Mutex<ReservationList>,
    closing: Mutex<ReservationList>,
    outlays: Mutex<ReservationHoldings>,
}

impl AuthorityCalendar {
    pub fn new(base: BaseCalendar) -> Self {
        AuthorityCalendar { base, requests: Mutex::new(ReservationList::new()), closing: Mutex::new(ReservationList::new()), outlays: Mutex::new(ReservationHoldings::new()) }
    }

    pub fn base(&self) -> &BaseCalendar {
        &self.base
    }

    pub fn add_request(&self, reservation: ReservationId, cycle: i64) {
        self.requests.lock().unwrap().add(reservation, cycle);
    }

    pub fn requests_at(&self, cycle: i64) -> std::collections::HashSet<ReservationId> {
        self.requests.lock().unwrap().get(cycle)
    }

    pub fn add_closing(&self, reservation: ReservationId, cycle: i64) {
        self.closing.lock().unwrap().add(reservation, cycle);
    }

    pub fn closing_at(&self, cycle: i64) -> std::collections::HashSet<ReservationId> {
        self.closing.lock().unwrap().get(cycle)
    }

    pub fn add_outlay(&self, reservation: ReservationId, start_ms: i64, end_ms: i64, resource_type: Option<String>) -> crate::error::Result<()> {
        self.outlays.lock().unwrap().add(reservation, start_ms, end_ms, resource_type)
    }

    pub fn remove_reservation(&self, reservation: ReservationId) {
        self.requests.lock().unwrap().remove(reservation);
        self.closing.lock().unwrap().remove(reservation);
        self.outlays.lock().unwrap().remove(reservation);
    }

    pub fn tick(&self, cycle: i64) {
        let cutoff_ms = self.base.cycle_end_ms(cycle);
        self.requests.lock().unwrap().tick(cycle);
        self.closing.lock().unwrap().tick(cycle);
        self.outlays.lock().unwrap().tick(cutoff_ms);
    }
}
