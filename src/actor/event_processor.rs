use std::collections::HashMap;
use std::sync::Arc;

use actix::fut::{ActorFutureExt, WrapFuture};
use actix::prelude::{Actor, Context, Handler};
use chrono::{TimeZone, Utc};
use log::{error, info, warn};

use crate::calendar::{AuthorityCalendar, BaseCalendar, BrokerCalendar, ClientCalendar};
use crate::clock::ActorClock;
use crate::error::{ControlPlaneError, Result};
use crate::id::{ActorId, ReservationId, SliceId};
use crate::peer_registry::PeerRegistry;
use crate::persistence::Store;
use crate::plugin::Plugin;
use crate::policy::Policy;
use crate::reservation::{Pending, Reservation, ReservationCategory, ReservationState};
use crate::resource::ResourceSet;
use crate::slice::Slice;
use crate::term::Term;

use super::messages::{ApiRequest, ApiResponse, InterActorMsg, PeerReplyKind, TickMsg};

/// Per-role calendar the kernel owns. Only the active variant's indices are
/// touched on a tick; the others sit idle, matching the testbed's
/// Authority/Broker/Client calendar split at §4.4.
pub enum RoleCalendar {
    Client(ClientCalendar),
    Broker(BrokerCalendar),
    Authority(Arc<AuthorityCalendar>),
}

impl RoleCalendar {
    fn tick(&self, cycle: i64) {
        match self {
            RoleCalendar::Client(c) => c.tick(cycle),
            RoleCalendar::Broker(c) => c.tick(cycle),
            RoleCalendar::Authority(c) => c.tick(cycle),
        }
    }
}

/// The single-threaded per-actor serialization kernel (spec component F /
/// "EventProcessor"). Every reservation and calendar mutation for this
/// actor happens inside one of this struct's `Handler` impls, which actix
/// guarantees run one at a time on the actor's own task — the actor's
/// mailbox *is* the FIFO queue spec.md asks for, so there is no separate
/// queue/condvar/worker-thread to hand-roll.
///
/// Ordering follows directly from that guarantee: messages already enqueued
/// before a `TickMsg` are drained from the mailbox before the tick handler
/// runs, so "process inbound replies accumulated since last tick" falls out
/// for free rather than needing a second queue inside the tick handler.
pub struct ActorKernel {
    pub id: ActorId,
    pub name: String,
    pub category: ReservationCategory,
    clock: ActorClock,
    calendar: RoleCalendar,
    last_cycle: i64,
    reservations: HashMap<ReservationId, Reservation>,
    slices: HashMap<SliceId, Slice>,
    policy: Arc<dyn Policy>,
    plugin: Arc<dyn Plugin>,
    store: Arc<dyn Store>,
    peer_registry: Arc<PeerRegistry>,
}

impl ActorKernel {
    pub fn new(id: ActorId, name: impl Into<String>, category: ReservationCategory, clock: ActorClock, policy: Arc<dyn Policy>, plugin: Arc<dyn Plugin>, store: Arc<dyn Store>, peer_registry: Arc<PeerRegistry>) -> Self {
        let base = BaseCalendar::new(clock);
        let calendar = match category {
            ReservationCategory::Authority => RoleCalendar::Authority(Arc::new(AuthorityCalendar::new(base))),
            ReservationCategory::Broker => RoleCalendar::Broker(BrokerCalendar::new(base)),
            ReservationCategory::Client | ReservationCategory::Controller => RoleCalendar::Client(ClientCalendar::new(base)),
        };
        ActorKernel { id, name: name.into(), category, clock, calendar, last_cycle: i64::MIN, reservations: HashMap::new(), slices: HashMap::new(), policy, plugin, store, peer_registry }
    }

    fn predecessors_satisfied(&self, reservation: &Reservation) -> bool {
        reservation.predecessors.iter().all(|p| self.reservations.get(&p.reservation_id).map(|pred| pred.state == ReservationState::Active).unwrap_or(false))
    }

    /// Authority-side admission: every Nascent/Ticketing reservation due
    /// this cycle is scheduled onto `requests(c)` and run through
    /// `Policy::allocate`. Not meaningful for broker/controller roles, which
    /// negotiate tickets against a remote authority through the out-of-scope
    /// proxy transport (spec §1) rather than a local policy call.
    fn issue_tickets(&mut self, cycle: i64, ctx: &mut Context<Self>) {
        let RoleCalendar::Authority(cal) = &self.calendar else { return };
        let now = Utc.timestamp_millis_opt(self.clock.cycle_start_ms(cycle)).single().unwrap_or_else(Utc::now);

        let due: Vec<ReservationId> = self.reservations.iter().filter(|(_, r)| r.state == ReservationState::Nascent && r.pending == Pending::Ticketing).map(|(id, _)| *id).collect();

        for id in due {
            cal.add_request(id, cycle);
            let (request, term) = match self.reservations.get(&id) {
                Some(r) => (r.requested.clone(), r.requested_term),
                None => continue,
            };
            let policy = Arc::clone(&self.policy);
            let cal = Arc::clone(cal);
            let fut = async move { policy.allocate(&request, &term, &cal, now).await };
            ctx.spawn(fut.into_actor(self).map(move |result, actor, _ctx| {
                actor.apply_ticket_result(id, result);
            }));
        }
    }

    fn apply_ticket_result(&mut self, id: ReservationId, result: Result<Option<(ResourceSet, Term)>>) {
        let outcome = match result {
            Ok(granted) => granted,
            Err(e) => {
                warn!("allocation policy failed for {id}: {e}");
                None
            }
        };
        if let Some(r) = self.reservations.get_mut(&id) {
            let ok = outcome.is_some();
            if let Err(e) = r.on_ticket_reply(ok, outcome) {
                error!("ticket reply precondition failed for {id}: {e}");
                return;
            }
        }
        self.persist(id);
    }

    /// Applies a `Policy::extend` verdict to whichever pending extension
    /// `ExtendEndTime` started (ticket or lease), mirroring
    /// `apply_ticket_result`'s treatment of a policy failure as a denial
    /// rather than propagating the error to the long-since-acknowledged
    /// caller.
    fn apply_extend_result(&mut self, id: ReservationId, result: Result<Option<Term>>) {
        let outcome = match result {
            Ok(term) => term,
            Err(e) => {
                warn!("extend policy failed for {id}: {e}");
                None
            }
        };
        if let Some(r) = self.reservations.get_mut(&id) {
            let ok = outcome.is_some();
            let applied = if r.pending == Pending::ExtendingLease { r.on_extend_lease_reply(ok, outcome) } else { r.on_extend_ticket_reply(ok, outcome) };
            if let Err(e) = applied {
                error!("extend reply precondition failed for {id}: {e}");
                return;
            }
        }
        self.persist(id);
    }

    /// Redeem + prime for every Ticketed/None reservation whose approved
    /// term has reached `new_start` and whose predecessors are satisfied.
    /// Only meaningful when this kernel owns concrete resources, i.e. for an
    /// Authority-role actor acting on its own plugin directly; broker and
    /// controller roles negotiate redeem through an outbound peer call,
    /// which is outside this engine's scope (spec §1 marks the proxy
    /// transport an external collaborator).
    fn issue_redeems(&mut self, cycle: i64, ctx: &mut Context<Self>) {
        if self.category != ReservationCategory::Authority {
            return;
        }
        let cutoff_ms = self.clock.cycle_start_ms(cycle);
        let ready: Vec<ReservationId> = self
            .reservations
            .iter()
            .filter(|(_, r)| r.state == ReservationState::Ticketed && r.pending == Pending::None)
            .filter(|(_, r)| r.approved_term.map(|t| t.new_start().timestamp_millis() <= cutoff_ms).unwrap_or(false))
            .filter(|(_, r)| self.predecessors_satisfied(r))
            .map(|(id, _)| *id)
            .collect();

        for id in ready {
            if let Some(r) = self.reservations.get_mut(&id) {
                if let Err(e) = r.redeem(cutoff_ms, true) {
                    warn!("redeem precondition failed for {id}: {e}");
                    continue;
                }
            } else {
                continue;
            }

            let plugin = Arc::clone(&self.plugin);
            let reservation = self.reservations.get(&id).cloned().expect("checked above");
            let fut = async move { plugin.redeem(&reservation).await };
            ctx.spawn(fut.into_actor(self).map(move |result, actor, ctx| {
                actor.apply_redeem_result(id, result, ctx);
            }));
        }
    }

    fn apply_redeem_result(&mut self, id: ReservationId, result: Result<crate::resource::ConcreteSet>, ctx: &mut Context<Self>) {
        let ok = result.is_ok();
        if let Some(r) = self.reservations.get_mut(&id) {
            if let Err(e) = r.on_redeem_reply(ok) {
                error!("redeem reply precondition failed for {id}: {e}");
                return;
            }
            if let Ok(concrete) = result {
                let mut resources = r.approved.clone().unwrap_or_else(|| r.requested.clone());
                resources.concrete = Some(concrete);
                r.resources = Some(resources);
            }
        }
        if ok {
            self.run_prime(id, ctx);
        } else {
            self.persist(id);
        }
    }

    /// Collapses the setup/probe/done sub-protocol into one async round trip
    /// for this engine's scope: call `setup`, then `probe` once, and advance
    /// straight to `Done` on success. A deployment with a slower concrete
    /// resource bring-up would re-poll `probe` on subsequent ticks instead.
    fn run_prime(&mut self, id: ReservationId, ctx: &mut Context<Self>) {
        let plugin = Arc::clone(&self.plugin);
        let reservation = match self.reservations.get(&id) {
            Some(r) => r.clone(),
            None => return,
        };
        let fut = async move {
            plugin.setup(&reservation).await?;
            plugin.probe(&reservation).await
        };
        ctx.spawn(fut.into_actor(self).map(move |result, actor, ctx| {
            actor.apply_prime_result(id, result, ctx);
        }));
    }

    fn apply_prime_result(&mut self, id: ReservationId, result: Result<bool>, _ctx: &mut Context<Self>) {
        let probed = matches!(result, Ok(true));
        if let Some(r) = self.reservations.get_mut(&id) {
            if probed {
                if let Err(e) = r.advance_join(crate::reservation::JoinState::Done) {
                    error!("prime completion rejected for {id}: {e}");
                }
                if let RoleCalendar::Authority(cal) = &self.calendar {
                    if let (Some(term), true) = (r.term, r.state == ReservationState::Active) {
                        let _ = cal.add_outlay(id, term.start().timestamp_millis(), term.end().timestamp_millis(), Some(r.requested.resource_type.clone()));
                    }
                }
            } else {
                r.fail("concrete resource probe failed");
            }
        }
        self.persist(id);
    }

    fn auto_close(&mut self, cycle: i64, ctx: &mut Context<Self>) {
        let now = Utc.timestamp_millis_opt(self.clock.cycle_start_ms(cycle)).single().unwrap_or_else(Utc::now);
        let expiring: Vec<ReservationId> = self.reservations.iter().filter(|(_, r)| r.state == ReservationState::Active).map(|(id, _)| *id).collect();
        for id in expiring {
            let closed = if let Some(r) = self.reservations.get_mut(&id) { r.maybe_auto_close(now) } else { false };
            if closed {
                let plugin = Arc::clone(&self.plugin);
                let reservation = self.reservations.get(&id).cloned().expect("checked above");
                let fut = async move { plugin.close(&reservation).await };
                ctx.spawn(fut.into_actor(self).map(move |result, actor, _ctx| {
                    actor.apply_close_result(id, result);
                }));
            }
        }
    }

    /// Dispatches the concrete teardown once a reservation has actually
    /// entered `Closing`/`Closing` — a no-op for non-Authority roles, which
    /// own no concrete set to tear down locally.
    fn spawn_concrete_close_if_pending(&mut self, id: ReservationId, ctx: &mut Context<Self>) {
        if self.category != ReservationCategory::Authority {
            return;
        }
        if !self.reservations.get(&id).map(|r| r.pending == Pending::Closing).unwrap_or(false) {
            return;
        }
        let plugin = Arc::clone(&self.plugin);
        let reservation = self.reservations.get(&id).cloned().expect("checked above");
        let fut = async move { plugin.close(&reservation).await };
        ctx.spawn(fut.into_actor(self).map(move |result, actor, _ctx| {
            actor.apply_close_result(id, result);
        }));
    }

    /// Policy-driven close (transition table row "Close (external or
    /// policy)"): each tick, every Active/None reservation not yet past
    /// `term.end` (that path is `maybe_auto_close`'s hard rule) is offered to
    /// `Policy::close_eligible`; a `true` verdict starts the same close
    /// sequence an explicit `close()` API call would.
    fn policy_driven_close(&mut self, cycle: i64, ctx: &mut Context<Self>) {
        if self.category != ReservationCategory::Authority {
            return;
        }
        let now = Utc.timestamp_millis_opt(self.clock.cycle_start_ms(cycle)).single().unwrap_or_else(Utc::now);
        let candidates: Vec<ReservationId> = self.reservations.iter().filter(|(_, r)| r.state == ReservationState::Active && r.pending == Pending::None).map(|(id, _)| *id).collect();

        for id in candidates {
            let reservation = match self.reservations.get(&id) {
                Some(r) => r.clone(),
                None => continue,
            };
            let policy = Arc::clone(&self.policy);
            let fut = async move { policy.close_eligible(&reservation, now).await };
            ctx.spawn(fut.into_actor(self).map(move |eligible, actor, ctx| {
                if eligible && actor.reservations.get(&id).map(|r| r.state == ReservationState::Active).unwrap_or(false) {
                    if let Some(r) = actor.reservations.get_mut(&id) {
                        let _ = r.close();
                    }
                    actor.persist(id);
                    actor.spawn_concrete_close_if_pending(id, ctx);
                }
            }));
        }
    }

    fn apply_close_result(&mut self, id: ReservationId, result: Result<()>) {
        if let Err(e) = result {
            if let Some(r) = self.reservations.get_mut(&id) {
                r.fail(format!("concrete resource teardown failed: {e}"));
            }
            self.persist(id);
            return;
        }
        if let Some(r) = self.reservations.get_mut(&id) {
            let _ = r.on_close_done();
        }
        match &self.calendar {
            RoleCalendar::Client(c) => c.remove_holding(id),
            RoleCalendar::Broker(c) => c.client().remove_holding(id),
            RoleCalendar::Authority(_) => {}
        }
        self.persist(id);
    }

    fn persist(&self, id: ReservationId) {
        if let Some(r) = self.reservations.get(&id).cloned() {
            let store = Arc::clone(&self.store);
            actix::spawn(async move {
                if let Err(e) = store.put_reservation(r).await {
                    error!("failed to persist reservation: {e}");
                }
            });
        }
    }

    fn add_reservation(&mut self, mut reservation: Reservation) -> Result<ReservationId> {
        if !self.slices.contains_key(&reservation.slice_id) {
            return Err(ControlPlaneError::Validation(format!("unknown slice {}", reservation.slice_id)));
        }
        reservation.state = ReservationState::Nascent;
        reservation.pending = Pending::None;
        let id = reservation.id;
        self.reservations.insert(id, reservation);
        self.persist(id);
        Ok(id)
    }
}

impl Actor for ActorKernel {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("actor kernel '{}' started ({:?})", self.name, self.category);
    }
}

impl Handler<TickMsg> for ActorKernel {
    type Result = ();

    fn handle(&mut self, msg: TickMsg, ctx: &mut Context<Self>) -> Self::Result {
        let cycle = msg.cycle;
        if cycle <= self.last_cycle {
            warn!("ignoring non-increasing tick cycle={cycle} (last={})", self.last_cycle);
            return;
        }
        self.last_cycle = cycle;
        // §5 sub-order: (1) prune, (2) inbound replies already drained from
        // the mailbox ahead of this TickMsg, (3) policy-driven issuance, (4)
        // auto-close.
        self.calendar.tick(cycle);
        self.issue_tickets(cycle, ctx);
        self.issue_redeems(cycle, ctx);
        self.policy_driven_close(cycle, ctx);
        self.auto_close(cycle, ctx);
    }
}

impl Handler<InterActorMsg> for ActorKernel {
    type Result = Result<()>;

    fn handle(&mut self, msg: InterActorMsg, _ctx: &mut Context<Self>) -> Self::Result {
        let reservation = self.reservations.get_mut(&msg.reservation_id).ok_or_else(|| ControlPlaneError::NotFound(msg.reservation_id.to_string()))?;
        match msg.kind {
            PeerReplyKind::TicketReply { ok, resources, term } => reservation.on_ticket_reply(ok, resources.zip(term))?,
            PeerReplyKind::ExtendTicketReply { ok, term } => reservation.on_extend_ticket_reply(ok, term)?,
            PeerReplyKind::RedeemReply { ok } => reservation.on_redeem_reply(ok)?,
            PeerReplyKind::PrimeProgress { join_state } => reservation.advance_join(join_state)?,
            PeerReplyKind::ExtendLeaseReply { ok, term } => reservation.on_extend_lease_reply(ok, term)?,
            PeerReplyKind::CloseDone => reservation.on_close_done()?,
        }
        self.persist(msg.reservation_id);
        Ok(())
    }
}

impl Handler<ApiRequest> for ActorKernel {
    type Result = Result<ApiResponse>;

    fn handle(&mut self, msg: ApiRequest, ctx: &mut Context<Self>) -> Self::Result {
        match msg {
            ApiRequest::AddReservation(r) => self.add_reservation(r).map(ApiResponse::AssignedId),
            ApiRequest::Demand(id) => {
                let r = self.reservations.get_mut(&id).ok_or_else(|| ControlPlaneError::NotFound(id.to_string()))?;
                r.demand()?;
                self.persist(id);
                Ok(ApiResponse::Ack)
            }
            ApiRequest::ExtendEndTime { id, new_end, .. } => {
                let current_term = {
                    let r = self.reservations.get(&id).ok_or_else(|| ControlPlaneError::NotFound(id.to_string()))?;
                    r.term.or(r.approved_term).ok_or_else(|| ControlPlaneError::Validation("no term to extend".into()))?
                };

                if let RoleCalendar::Authority(cal) = &self.calendar {
                    // Route through the policy seam the same way allocate/close_eligible do:
                    // mark the pending transition synchronously so a second request in the
                    // same mailbox drain sees it, then resolve the actual admitted term async.
                    let r = self.reservations.get_mut(&id).expect("checked above");
                    if r.state == ReservationState::Active {
                        r.extend_lease()?;
                    } else {
                        r.extend_ticket()?;
                    }
                    let reservation = self.reservations.get(&id).cloned().expect("checked above");
                    let policy = Arc::clone(&self.policy);
                    let cal = Arc::clone(cal);
                    let now = Utc::now();
                    let fut = async move { policy.extend(&reservation, new_end, &cal, now).await };
                    ctx.spawn(fut.into_actor(self).map(move |result, actor, _ctx| {
                        actor.apply_extend_result(id, result);
                    }));
                } else {
                    let extended = current_term.extend(new_end)?;
                    let r = self.reservations.get_mut(&id).expect("checked above");
                    if r.state == ReservationState::Active {
                        r.extend_lease()?;
                        r.on_extend_lease_reply(true, Some(extended))?;
                    } else {
                        r.extend_ticket()?;
                        r.on_extend_ticket_reply(true, Some(extended))?;
                    }
                }
                self.persist(id);
                Ok(ApiResponse::Ack)
            }
            ApiRequest::Close(id) => {
                let r = self.reservations.get_mut(&id).ok_or_else(|| ControlPlaneError::NotFound(id.to_string()))?;
                r.close()?;
                self.persist(id);
                self.spawn_concrete_close_if_pending(id, ctx);
                Ok(ApiResponse::Ack)
            }
            ApiRequest::GetSlices => Ok(ApiResponse::Slices(self.slices.values().cloned().collect())),
            ApiRequest::GetReservations { slice } => {
                let list = self.reservations.values().filter(|r| slice.map(|s| s == r.slice_id).unwrap_or(true)).cloned().collect();
                Ok(ApiResponse::Reservations(list))
            }
            ApiRequest::ClaimResources { broker, reservation } => {
                self.peer_registry.get(broker)?;
                let r = self.reservations.get(&reservation).ok_or_else(|| ControlPlaneError::NotFound(reservation.to_string()))?;
                Ok(ApiResponse::Reservation(r.clone()))
            }
        }
    }
}

/// Not part of the public API: lets `main`/tests register a slice before
/// any reservation referencing it arrives.
impl ActorKernel {
    pub fn register_slice(&mut self, slice: Slice) {
        self.slices.insert(slice.id, slice);
    }
}
