use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

use uuid::Uuid;

/// An opaque, globally-unique, phantom-tagged identifier.
///
/// Spec requires a 128-bit opaque id with total ordering, equality and
/// hashing; `uuid::Uuid` provides exactly that. The phantom tag keeps ids of
/// different entity kinds (reservation, slice, actor, ...) from being
/// accidentally interchanged at compile time without adding any runtime
/// behavior beyond a plain uuid.
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T> {
    uuid: Uuid,
    #[serde(skip)]
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new() -> Self {
        Id { uuid: Uuid::new_v4(), _marker: PhantomData }
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Id { uuid, _marker: PhantomData }
    }

    pub fn as_uuid(&self) -> Uuid {
        self.uuid
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}
impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.uuid.cmp(&other.uuid)
    }
}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.rsplit("::").next().unwrap_or(full_name);
        write!(f, "{}({})", clean_name, self.uuid)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReservationTag;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceTag;
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorTag;

pub type ReservationId = Id<ReservationTag>;
pub type SliceId = Id<SliceTag>;
pub type ActorId = Id<ActorTag>;
