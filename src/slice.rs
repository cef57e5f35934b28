use serde::{Deserialize, Serialize};

use crate::id::{ActorId, SliceId};

/// A logical grouping of reservations belonging to one experiment.
///
/// A slice's own lifecycle (state) is independent of any reservation's
/// lifecycle; every reservation references exactly one slice but a slice's
/// state never gates a reservation's transitions directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SliceState {
    Nascent,
    Configuring,
    StableOk,
    StableError,
    Closing,
    Dead,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    pub id: SliceId,
    pub name: String,
    pub state: SliceState,
    pub owner: ActorId,
}

impl Slice {
    pub fn new(name: impl Into<String>, owner: ActorId) -> Self {
        Slice { id: SliceId::new(), name: name.into(), state: SliceState::Nascent, owner }
    }
}
