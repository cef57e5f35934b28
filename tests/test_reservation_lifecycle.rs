use chrono::{TimeZone, Utc};

use reservation_control_plane::id::SliceId;
use reservation_control_plane::reservation::{JoinState, PredecessorState, Reservation, ReservationCategory, ReservationState};
use reservation_control_plane::resource::ResourceSet;
use reservation_control_plane::term::Term;

fn ts(secs: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn to_ticketed(slice: SliceId, start: i64, end: i64) -> Reservation {
    let mut r = Reservation::new(slice, ReservationCategory::Broker, ResourceSet::new("vm", 1), Term::new(ts(start), ts(end)).unwrap());
    r.demand().unwrap();
    r.on_ticket_reply(true, Some((ResourceSet::new("vm", 1), Term::new(ts(start), ts(end)).unwrap()))).unwrap();
    r
}

/// A reservation with an unsatisfied predecessor must not redeem even once
/// its own term's new_start cycle has arrived.
#[test]
fn redeem_blocked_until_predecessor_active() {
    let slice = SliceId::new();
    let predecessor = to_ticketed(slice, 0, 100);
    let mut dependent = to_ticketed(slice, 0, 100);
    dependent.predecessors.push(PredecessorState::new(predecessor.id, None));

    assert!(dependent.redeem(0, false).is_err());
    assert!(dependent.redeem(0, true).is_ok());
    assert_eq!(dependent.state, ReservationState::Ticketed);
}

/// Close requested mid-Priming is deferred and applied once the join
/// sequence reaches Done rather than rejected outright.
#[test]
fn close_during_priming_applies_after_join_completes() {
    let slice = SliceId::new();
    let mut r = to_ticketed(slice, 0, 100);
    r.redeem(0, true).unwrap();
    r.on_redeem_reply(true).unwrap();

    r.close().unwrap();
    assert_eq!(r.deferred.len(), 1);
    assert_eq!(r.state, ReservationState::Ticketed);

    r.advance_join(JoinState::Done).unwrap();
    assert_eq!(r.state, ReservationState::Closing);
}

#[test]
fn failed_ticket_reply_marks_reservation_terminal() {
    let slice = SliceId::new();
    let mut r = Reservation::new(slice, ReservationCategory::Broker, ResourceSet::new("vm", 1), Term::new(ts(0), ts(100)).unwrap());
    r.demand().unwrap();
    r.on_ticket_reply(false, None).unwrap();
    assert_eq!(r.state, ReservationState::Failed);
    assert!(r.is_terminal());
}

#[test]
fn extend_lease_requires_active_state() {
    let slice = SliceId::new();
    let mut r = to_ticketed(slice, 0, 100);
    assert!(r.extend_lease().is_err());
}
