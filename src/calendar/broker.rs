use std::collections::HashMap;
use std::sync::Mutex;

use crate::id::ReservationId;

use super::base::BaseCalendar;
use super::client::ClientCalendar;
use super::reservation_list::ReservationList;
use super::source::SourceCalendar;

/// `ClientCalendar + closing + requests + per-source calendars`. A broker
/// processes inbound `requests(c)`, per-source `extending(c)`, and
/// `closing(c)` on every tick; allocation draws outlays from the matching
/// `SourceCalendar`.
#[derive(Debug)]
pub struct BrokerCalendar {
    client: ClientCalendar,
    closing: Mutex<ReservationList>,
    requests: Mutex<ReservationList>,
    sources: Mutex<HashMap<ReservationId, SourceCalendar>>,
}

impl BrokerCalendar {
    pub fn new(base: BaseCalendar) -> Self {
        BrokerCalendar { client: ClientCalendar::new(base), closing: Mutex::new(ReservationList::new()), requests: Mutex::new(ReservationList::new()), sources: Mutex::new(HashMap::new()) }
    }

    pub fn client(&self) -> &ClientCalendar {
        &self.client
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

    pub fn add_source(&self, source_id: ReservationId) {
        self.sources.lock().unwrap().entry(source_id).or_insert_with(SourceCalendar::new);
    }

    pub fn with_source<R>(&self, source_id: ReservationId, f: impl FnOnce(&SourceCalendar) -> R) -> Option<R> {
        self.sources.lock().unwrap().get(&source_id).map(f)
    }

    pub fn remove_source(&self, source_id: ReservationId) {
        self.sources.lock().unwrap().remove(&source_id);
    }

    /// Removal of a reservation removes it from every sub-index in one
    /// locked critical section per index.
    pub fn remove_reservation(&self, reservation: ReservationId) {
        self.client.remove_pending(reservation);
        self.client.remove_holding(reservation);
        self.requests.lock().unwrap().remove(reservation);
        self.closing.lock().unwrap().remove(reservation);
    }

    pub fn tick(&self, cycle: i64) {
        let cutoff_ms = self.client.base().cycle_end_ms(cycle);
        self.client.tick(cycle);
        self.requests.lock().unwrap().tick(cycle);
        self.closing.lock().unwrap().tick(cycle);
        for source in self.sources.lock().unwrap().values() {
            source.tick(cycle, cutoff_ms);
        }
    }
}
