use reservation_control_plane::calendar::{AuthorityCalendar, BaseCalendar, BrokerCalendar};
use reservation_control_plane::clock::ActorClock;
use reservation_control_plane::id::ReservationId;

#[test]
fn authority_calendar_tick_prunes_requests_closing_and_outlays() {
    let clock = ActorClock::new(0, 100);
    let authority = AuthorityCalendar::new(BaseCalendar::new(clock));

    let r1 = ReservationId::new();
    authority.add_request(r1, 2);
    authority.add_outlay(r1, 0, clock.cycle_end_ms(2), None).unwrap();

    authority.tick(2);

    assert!(authority.requests_at(2).is_empty());
}

#[test]
fn broker_calendar_removes_reservation_from_every_sub_index() {
    let clock = ActorClock::new(0, 50);
    let broker = BrokerCalendar::new(BaseCalendar::new(clock));

    let r1 = ReservationId::new();
    broker.client().add_pending(r1, 1);
    broker.add_request(r1, 1);
    broker.add_closing(r1, 1);
    broker.client().add_holding(r1, 0, 1000, None).unwrap();

    broker.remove_reservation(r1);

    assert!(broker.client().pending_at(1).is_empty());
    assert!(broker.requests_at(1).is_empty());
    assert!(broker.closing_at(1).is_empty());
    assert!(broker.client().holdings_at(500).is_empty());
}

#[test]
fn zero_reservations_queries_return_empty_sets() {
    let clock = ActorClock::new(0, 100);
    let authority = AuthorityCalendar::new(BaseCalendar::new(clock));
    assert!(authority.requests_at(0).is_empty());
    assert!(authority.closing_at(0).is_empty());
}

#[test]
fn broker_source_calendar_tracks_per_source_outlays() {
    let clock = ActorClock::new(0, 100);
    let broker = BrokerCalendar::new(BaseCalendar::new(clock));
    let source_id = ReservationId::new();
    let child = ReservationId::new();

    broker.add_source(source_id);
    broker.with_source(source_id, |source| source.add_outlay(child, 0, 500, None).unwrap()).unwrap();

    let contains = broker.with_source(source_id, |source| source.outlays_at(250).contains(&child)).unwrap();
    assert!(contains);
}
