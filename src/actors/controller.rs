use std::sync::Arc;

use actix::prelude::{Actor, Addr};

use crate::actor::ActorKernel;
use crate::clock::ActorClock;
use crate::id::ActorId;
use crate::peer_registry::PeerRegistry;
use crate::persistence::Store;
use crate::plugin::NullPlugin;
use crate::policy::Policy;
use crate::reservation::ReservationCategory;

/// Issues demand/extend/close to brokers and authorities; tracks pending
/// start cycles to know when to emit redeems. Experimenter-facing, so it
/// never touches concrete resources itself.
pub fn spawn_controller(name: impl Into<String>, clock: ActorClock, policy: Arc<dyn Policy>, store: Arc<dyn Store>, peer_registry: Arc<PeerRegistry>) -> Addr<ActorKernel> {
    let kernel = ActorKernel::new(ActorId::new(), name, ReservationCategory::Controller, clock, policy, Arc::new(NullPlugin), store, peer_registry);
    kernel.start()
}
