use std::sync::Arc;

use actix::prelude::{Actor, Addr};

use crate::actor::ActorKernel;
use crate::clock::ActorClock;
use crate::id::ActorId;
use crate::peer_registry::PeerRegistry;
use crate::persistence::Store;
use crate::plugin::Plugin;
use crate::policy::Policy;
use crate::reservation::ReservationCategory;

/// Owns physical inventory. Per tick, admits/denies `requests(c)` via
/// policy, tears down `closing(c)` via the concrete plugin, and prunes
/// `outlays` to the cycle's end millisecond — all of which `ActorKernel`
/// already implements generically for the `Authority` category; this is
/// just the typed constructor spec.md §4.8 calls out.
pub fn spawn_authority(name: impl Into<String>, clock: ActorClock, policy: Arc<dyn Policy>, plugin: Arc<dyn Plugin>, store: Arc<dyn Store>, peer_registry: Arc<PeerRegistry>) -> Addr<ActorKernel> {
    let kernel = ActorKernel::new(ActorId::new(), name, ReservationCategory::Authority, clock, policy, plugin, store, peer_registry);
    kernel.start()
}
