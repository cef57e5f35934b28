use serde::{Deserialize, Serialize};

use crate::id::ReservationId;

/// A reservation this one waits on before it may redeem, plus an optional
/// filter narrowing which state of the predecessor satisfies the wait.
///
/// Persisted as an id (+ optional filter string), never a live reference —
/// predecessors are re-resolved against the owning actor's reservation store
/// on load, matching the recovery model of rebuilding calendar state from
/// persisted facts without contacting peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredecessorState {
    pub reservation_id: ReservationId,
    pub filter: Option<String>,
}

impl PredecessorState {
    pub fn new(reservation_id: ReservationId, filter: Option<String>) -> Self {
        PredecessorState { reservation_id, filter }
    }
}
