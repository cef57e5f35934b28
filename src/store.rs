use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use slotmap::{SlotMap, new_key_type};

use crate::error::Result;
use crate::id::{ActorId, ReservationId, SliceId};
use crate::persistence::Store;
use crate::reservation::Reservation;
use crate::slice::Slice;

new_key_type! {
    struct ReservationKey;
}
new_key_type! {
    struct SliceKey;
}

#[derive(Debug, Default)]
struct ReservationInner {
    slots: SlotMap<ReservationKey, Reservation>,
    index: HashMap<ReservationId, ReservationKey>,
}

#[derive(Debug, Default)]
struct SliceInner {
    slots: SlotMap<SliceKey, Slice>,
    index: HashMap<SliceId, SliceKey>,
}

/// Default in-memory, slotmap-keyed implementation of `Store`, used by
/// tests and single-process demos. A real deployment swaps this for a
/// database-backed implementation behind the same trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    reservations: Arc<RwLock<ReservationInner>>,
    slices: Arc<RwLock<SliceInner>>,
    brokers: Arc<RwLock<Vec<ActorId>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn put_reservation(&self, reservation: Reservation) -> Result<()> {
        let mut guard = self.reservations.write().expect("reservation store lock poisoned");
        let id = reservation.id;
        if let Some(&key) = guard.index.get(&id) {
            guard.slots[key] = reservation;
        } else {
            let key = guard.slots.insert(reservation);
            guard.index.insert(id, key);
        }
        Ok(())
    }

    async fn get_reservation(&self, id: ReservationId) -> Result<Option<Reservation>> {
        let guard = self.reservations.read().expect("reservation store lock poisoned");
        Ok(guard.index.get(&id).and_then(|&key| guard.slots.get(key)).cloned())
    }

    async fn list_reservations(&self, slice: Option<SliceId>) -> Result<Vec<Reservation>> {
        let guard = self.reservations.read().expect("reservation store lock poisoned");
        Ok(guard.slots.values().filter(|r| slice.map(|s| s == r.slice_id).unwrap_or(true)).cloned().collect())
    }

    async fn put_slice(&self, slice: Slice) -> Result<()> {
        let mut guard = self.slices.write().expect("slice store lock poisoned");
        let id = slice.id;
        if let Some(&key) = guard.index.get(&id) {
            guard.slots[key] = slice;
        } else {
            let key = guard.slots.insert(slice);
            guard.index.insert(id, key);
        }
        Ok(())
    }

    async fn get_slice(&self, id: SliceId) -> Result<Option<Slice>> {
        let guard = self.slices.read().expect("slice store lock poisoned");
        Ok(guard.index.get(&id).and_then(|&key| guard.slots.get(key)).cloned())
    }

    async fn put_broker(&self, broker: ActorId) -> Result<()> {
        let mut guard = self.brokers.write().expect("broker list lock poisoned");
        if !guard.contains(&broker) {
            guard.push(broker);
        }
        Ok(())
    }

    async fn get_brokers(&self) -> Result<Vec<ActorId>> {
        Ok(self.brokers.read().expect("broker list lock poisoned").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::ReservationCategory;
    use crate::resource::ResourceSet;
    use crate::term::Term;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn put_reservation_is_idempotent_on_id() {
        let store = InMemoryStore::new();
        let term = Term::new(Utc.timestamp_opt(0, 0).unwrap(), Utc.timestamp_opt(100, 0).unwrap()).unwrap();
        let mut r = Reservation::new(SliceId::new(), ReservationCategory::Client, ResourceSet::new("vm", 1), term);
        let id = r.id;
        store.put_reservation(r.clone()).await.unwrap();
        r.demand().unwrap();
        store.put_reservation(r.clone()).await.unwrap();

        let fetched = store.get_reservation(id).await.unwrap().unwrap();
        assert_eq!(fetched.pending, r.pending);
        assert_eq!(store.list_reservations(None).await.unwrap().len(), 1);
    }
}
