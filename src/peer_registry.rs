use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use actix::prelude::Recipient;

use crate::actor::messages::ApiRequest;
use crate::error::{ControlPlaneError, Result};
use crate::id::ActorId;
use crate::persistence::Store;

/// A handle to a peer actor reachable through the same actix mailbox
/// mechanism used locally — in this single-process engine, peers are just
/// other `ActorKernel` addresses; a networked deployment would swap this for
/// a handle that serializes onto a wire protocol instead.
pub type ProxyHandle = Recipient<ApiRequest>;

/// In-memory `guid -> ProxyHandle` directory with a default-broker election.
///
/// Grounded on the testbed's `peer_registry.py`: initialization loads known
/// brokers from the persistence layer and the first one loaded is elected
/// default if none is set yet; removal is by guid.
#[derive(Default)]
struct Inner {
    peers: HashMap<ActorId, ProxyHandle>,
    default_broker: Option<ActorId>,
}

#[derive(Default)]
pub struct PeerRegistry {
    inner: RwLock<Inner>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads known brokers from the store and registers their handles,
    /// electing the first one as default if none is set. `handles` supplies
    /// the live `ProxyHandle` for each known broker id (the store only
    /// persists the id, not a connectable handle).
    pub async fn load_from_store(&self, store: &dyn Store, handles: &HashMap<ActorId, ProxyHandle>) -> Result<()> {
        let brokers = store.get_brokers().await?;
        let mut guard = self.inner.write().expect("peer registry lock poisoned");
        for broker in brokers {
            if let Some(handle) = handles.get(&broker) {
                guard.peers.insert(broker, handle.clone());
                if guard.default_broker.is_none() {
                    guard.default_broker = Some(broker);
                }
            }
        }
        Ok(())
    }

    pub fn add_broker(&self, id: ActorId, handle: ProxyHandle) {
        let mut guard = self.inner.write().expect("peer registry lock poisoned");
        let is_first = guard.peers.is_empty();
        guard.peers.insert(id, handle);
        if is_first {
            guard.default_broker = Some(id);
        }
    }

    pub fn remove(&self, id: ActorId) {
        let mut guard = self.inner.write().expect("peer registry lock poisoned");
        guard.peers.remove(&id);
        if guard.default_broker == Some(id) {
            guard.default_broker = guard.peers.keys().next().copied();
        }
    }

    pub fn get(&self, id: ActorId) -> Result<ProxyHandle> {
        self.inner.read().expect("peer registry lock poisoned").peers.get(&id).cloned().ok_or_else(|| ControlPlaneError::UnknownPeer(id.to_string()))
    }

    pub fn default_broker(&self) -> Option<ActorId> {
        self.inner.read().expect("peer registry lock poisoned").default_broker
    }
}

