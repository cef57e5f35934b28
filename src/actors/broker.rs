use std::sync::Arc;

use actix::prelude::{Actor, Addr};

use crate::actor::ActorKernel;
use crate::clock::ActorClock;
use crate::id::ActorId;
use crate::peer_registry::PeerRegistry;
use crate::persistence::Store;
use crate::plugin::{NullPlugin, Plugin};
use crate::policy::Policy;
use crate::reservation::ReservationCategory;

/// Owns its upstream source reservations. Per tick, processes inbound
/// `requests(c)`, per-source `extending(c)`, and `closing(c)`; allocation
/// draws outlays from the matching `SourceCalendar`. A broker never owns
/// concrete resources directly, so it defaults to `NullPlugin` unless the
/// caller supplies one for testing.
pub fn spawn_broker(name: impl Into<String>, clock: ActorClock, policy: Arc<dyn Policy>, store: Arc<dyn Store>, peer_registry: Arc<PeerRegistry>) -> Addr<ActorKernel> {
    let kernel = ActorKernel::new(ActorId::new(), name, ReservationCategory::Broker, clock, policy, Arc::new(NullPlugin), store, peer_registry);
    kernel.start()
}

pub fn spawn_broker_with_plugin(name: impl Into<String>, clock: ActorClock, policy: Arc<dyn Policy>, plugin: Arc<dyn Plugin>, store: Arc<dyn Store>, peer_registry: Arc<PeerRegistry>) -> Addr<ActorKernel> {
    let kernel = ActorKernel::new(ActorId::new(), name, ReservationCategory::Broker, clock, policy, plugin, store, peer_registry);
    kernel.start()
}
