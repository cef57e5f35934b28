use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ControlPlaneError, Result};
use crate::id::{ReservationId, SliceId};
use crate::resource::ResourceSet;
use crate::term::Term;

use super::predecessor::PredecessorState;
use super::state::{DeferredIntent, JoinState, Pending, ReservationCategory, ReservationState};

/// The central entity: an abstract resource request coupled to an eventual
/// concrete allocation, progressing through the `(state, pending,
/// join_state)` transition table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub slice_id: SliceId,
    pub category: ReservationCategory,

    pub requested: ResourceSet,
    pub approved: Option<ResourceSet>,
    pub resources: Option<ResourceSet>,

    pub requested_term: Term,
    pub approved_term: Option<Term>,
    pub term: Option<Term>,

    pub state: ReservationState,
    pub pending: Pending,
    pub join_state: JoinState,

    pub predecessors: Vec<PredecessorState>,
    pub deferred: Vec<DeferredIntent>,

    pub expired: bool,
    pub notices: Vec<String>,
}

impl Reservation {
    pub fn new(slice_id: SliceId, category: ReservationCategory, requested: ResourceSet, requested_term: Term) -> Self {
        Reservation {
            id: ReservationId::new(),
            slice_id,
            category,
            requested,
            approved: None,
            resources: None,
            requested_term,
            approved_term: None,
            term: None,
            state: ReservationState::Nascent,
            pending: Pending::None,
            join_state: JoinState::NoJoin,
            predecessors: Vec::new(),
            deferred: Vec::new(),
            expired: false,
            notices: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal_state() && self.pending == Pending::None
    }

    fn require(&self, ok: bool, reason: impl Into<String>) -> Result<()> {
        if ok {
            Ok(())
        } else {
            Err(ControlPlaneError::StatePrecondition { reservation: self.id.to_string(), reason: reason.into() })
        }
    }

    fn note(&mut self, msg: impl Into<String>) {
        self.notices.push(msg.into());
    }

    /// `demand`: Nascent/None -> Nascent/Ticketing.
    pub fn demand(&mut self) -> Result<()> {
        self.require(self.state == ReservationState::Nascent && self.pending == Pending::None, "demand requires Nascent state with no pending operation")?;
        self.pending = Pending::Ticketing;
        Ok(())
    }

    /// Ticket reply received from the broker.
    pub fn on_ticket_reply(&mut self, ok: bool, approved: Option<(ResourceSet, Term)>) -> Result<()> {
        self.require(self.state == ReservationState::Nascent && self.pending == Pending::Ticketing, "ticket reply requires Nascent/Ticketing")?;
        if ok {
            let (resources, term) = approved.ok_or_else(|| ControlPlaneError::Validation("ticket reply OK without an approved term".into()))?;
            self.approved = Some(resources);
            self.approved_term = Some(term);
            self.state = ReservationState::Ticketed;
            self.pending = Pending::None;
        } else {
            self.state = ReservationState::Failed;
            self.pending = Pending::None;
            self.note("ticket request rejected by broker");
        }
        Ok(())
    }

    /// `extend_ticket`: legal from Ticketed, Active or ActiveTicketed with no
    /// pending operation. During Priming the request is deferred instead of
    /// rejected.
    pub fn extend_ticket(&mut self) -> Result<()> {
        if self.pending == Pending::Priming {
            self.deferred.push(DeferredIntent::ExtendTicket);
            return Ok(());
        }
        let eligible = matches!(self.state, ReservationState::Ticketed | ReservationState::Active | ReservationState::ActiveTicketed) && self.pending == Pending::None;
        self.require(eligible, "extend_ticket requires Ticketed/Active/ActiveTicketed with no pending operation")?;
        self.pending = Pending::ExtendingTicket;
        Ok(())
    }

    pub fn on_extend_ticket_reply(&mut self, ok: bool, new_term: Option<Term>) -> Result<()> {
        self.require(self.pending == Pending::ExtendingTicket, "extend-ticket reply requires pending=ExtendingTicket")?;
        if ok {
            if let Some(term) = new_term {
                self.approved_term = Some(term);
            }
            self.state = if self.state == ReservationState::Active { ReservationState::ActiveTicketed } else { ReservationState::Ticketed };
            self.pending = Pending::None;
        } else {
            self.pending = Pending::None;
            self.note("ticket extension rejected");
        }
        Ok(())
    }

    /// `redeem`: requires Ticketed/None, `cycle >= term.new_start`, and all
    /// predecessors satisfied (checked by the caller via
    /// `predecessors_satisfied`).
    pub fn redeem(&mut self, now_cycle_start_ms: i64, predecessors_satisfied: bool) -> Result<()> {
        self.require(self.state == ReservationState::Ticketed && self.pending == Pending::None, "redeem requires Ticketed/None")?;
        let term = self.approved_term.as_ref().ok_or_else(|| ControlPlaneError::Validation("redeem requires an approved term".into()))?;
        let ready = now_cycle_start_ms >= term.new_start().timestamp_millis();
        self.require(ready, "redeem requires cycle >= term.new_start")?;
        self.require(predecessors_satisfied, "redeem requires all predecessors Active")?;
        self.pending = Pending::Redeeming;
        Ok(())
    }

    pub fn on_redeem_reply(&mut self, ok: bool) -> Result<()> {
        self.require(self.pending == Pending::Redeeming, "redeem reply requires pending=Redeeming")?;
        if ok {
            self.pending = Pending::Priming;
            self.join_state = JoinState::Setup;
        } else {
            self.state = ReservationState::Failed;
            self.pending = Pending::None;
            self.note("redeem rejected by authority");
        }
        Ok(())
    }

    /// Prime/join sub-protocol progress, driven solely by the engine that
    /// owns the concrete set.
    pub fn advance_join(&mut self, next: JoinState) -> Result<()> {
        self.require(self.pending == Pending::Priming, "join advance requires pending=Priming")?;
        self.join_state = next;
        if next == JoinState::Done {
            self.state = ReservationState::Active;
            self.pending = Pending::None;
            self.term = self.approved_term;
            for deferred in std::mem::take(&mut self.deferred) {
                match deferred {
                    DeferredIntent::ExtendTicket => self.extend_ticket()?,
                    DeferredIntent::Close => self.close()?,
                }
            }
        }
        Ok(())
    }

    /// `extend_lease`: Active/None -> Active/ExtendingLease.
    pub fn extend_lease(&mut self) -> Result<()> {
        self.require(self.state == ReservationState::Active && self.pending == Pending::None, "extend_lease requires Active/None")?;
        self.pending = Pending::ExtendingLease;
        Ok(())
    }

    pub fn on_extend_lease_reply(&mut self, ok: bool, new_term: Option<Term>) -> Result<()> {
        self.require(self.pending == Pending::ExtendingLease, "extend-lease reply requires pending=ExtendingLease")?;
        if ok {
            if let Some(term) = new_term {
                self.term = Some(term);
            }
            self.pending = Pending::None;
        } else {
            self.pending = Pending::None;
            self.note("lease extension rejected");
        }
        Ok(())
    }

    /// `close`: legal from any non-terminal state. During Priming the close
    /// is deferred rather than applied immediately.
    pub fn close(&mut self) -> Result<()> {
        if self.pending == Pending::Priming {
            self.deferred.push(DeferredIntent::Close);
            return Ok(());
        }
        self.require(!self.is_terminal(), "close requires a non-terminal reservation")?;
        self.state = ReservationState::Closing;
        self.pending = Pending::Closing;
        Ok(())
    }

    pub fn on_close_done(&mut self) -> Result<()> {
        self.require(self.pending == Pending::Closing, "close-done requires pending=Closing")?;
        self.state = ReservationState::Closed;
        self.pending = Pending::None;
        self.resources = None;
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        if !self.is_terminal() {
            self.state = ReservationState::Failed;
            self.pending = Pending::None;
            self.expired = true;
            self.note(reason);
        }
    }

    /// Auto-close on tick when `now > term.end`, only from Active/None.
    pub fn maybe_auto_close(&mut self, now: DateTime<Utc>) -> bool {
        if self.state == ReservationState::Active && self.pending == Pending::None {
            if let Some(term) = self.term {
                if now > term.end() {
                    self.expired = true;
                    self.state = ReservationState::Closing;
                    self.pending = Pending::Closing;
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SliceId;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn fresh() -> Reservation {
        let term = Term::new(ts(0), ts(1000)).unwrap();
        Reservation::new(SliceId::new(), ReservationCategory::Client, ResourceSet::new("vm", 1), term)
    }

    #[test]
    fn happy_path_reaches_active_and_terminal() {
        let mut r = fresh();
        r.demand().unwrap();
        let approved_term = Term::new(ts(0), ts(1000)).unwrap();
        r.on_ticket_reply(true, Some((ResourceSet::new("vm", 1), approved_term))).unwrap();
        assert_eq!(r.state, ReservationState::Ticketed);

        r.redeem(0, true).unwrap();
        r.on_redeem_reply(true).unwrap();
        assert_eq!(r.pending, Pending::Priming);

        r.advance_join(JoinState::Probe).unwrap();
        r.advance_join(JoinState::Done).unwrap();
        assert_eq!(r.state, ReservationState::Active);
        assert_eq!(r.pending, Pending::None);

        assert!(r.maybe_auto_close(ts(2000)));
        r.on_close_done().unwrap();
        assert!(r.is_terminal());
    }

    #[test]
    fn redeem_before_new_start_is_rejected() {
        let mut r = fresh();
        r.demand().unwrap();
        let approved_term = Term::new(ts(500), ts(1000)).unwrap();
        r.on_ticket_reply(true, Some((ResourceSet::new("vm", 1), approved_term))).unwrap();
        assert!(r.redeem(0, true).is_err());
    }

    #[test]
    fn extend_ticket_during_priming_is_deferred() {
        let mut r = fresh();
        r.demand().unwrap();
        let approved_term = Term::new(ts(0), ts(1000)).unwrap();
        r.on_ticket_reply(true, Some((ResourceSet::new("vm", 1), approved_term))).unwrap();
        r.redeem(0, true).unwrap();
        r.on_redeem_reply(true).unwrap();
        r.extend_ticket().unwrap();
        assert_eq!(r.deferred.len(), 1);
        assert_eq!(r.pending, Pending::Priming);
    }

    #[test]
    fn terminal_is_sticky() {
        let mut r = fresh();
        r.fail("boom");
        assert!(r.is_terminal());
        r.fail("boom again");
        assert_eq!(r.notices.len(), 1);
    }
}
