use reservation_control_plane::clock::ActorClock;

/// S1 from the scenario catalogue: epoch=1000, cycle=10.
#[test]
fn s1_clock_arithmetic() {
    let clock = ActorClock::new(1000, 10);
    assert_eq!(clock.cycle(1000), 0);
    assert_eq!(clock.cycle(1009), 0);
    assert_eq!(clock.cycle(1010), 1);
    assert_eq!(clock.cycle_start_ms(5), 1050);
    assert_eq!(clock.cycle_end_ms(5), 1059);
}

#[test]
fn invariant_cycle_bounds_hold_for_arbitrary_ms() {
    let clock = ActorClock::new(42, 37);
    for ms in 42..42 + 37 * 50 {
        let cycle = clock.cycle(ms);
        assert!(clock.cycle_start_ms(cycle) <= ms);
        assert!(ms <= clock.cycle_end_ms(cycle));
    }
}
