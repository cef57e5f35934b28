use actix::prelude::Addr;

use crate::tick::Tickable;

use super::event_processor::ActorKernel;
use super::messages::TickMsg;

/// Adapts an `ActorKernel` address to the tick service's `Tickable`
/// interface: `external_tick` is a plain synchronous call, and
/// `Addr::do_send` is exactly that — a non-blocking enqueue into the
/// kernel's mailbox, never a wait for the tick to actually run.
pub struct KernelTickHandle {
    addr: Addr<ActorKernel>,
    name: String,
}

impl KernelTickHandle {
    pub fn new(addr: Addr<ActorKernel>, name: impl Into<String>) -> Self {
        KernelTickHandle { addr, name: name.into() }
    }
}

impl Tickable for KernelTickHandle {
    fn external_tick(&self, cycle: i64) {
        self.addr.do_send(TickMsg { cycle });
    }

    fn name(&self) -> &str {
        &self.name
    }
}
