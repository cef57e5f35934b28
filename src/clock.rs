use serde::{Deserialize, Serialize};

/// Maps wall-clock milliseconds onto discrete cycles.
///
/// Grounded on the FABRIC testbed's `IContainerClock`: the whole engine
/// reasons in cycles, not wall time, so every term/lease boundary is a cycle
/// number and this is the only place that ever touches `epoch_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorClock {
    epoch_ms: i64,
    cycle_ms: i64,
}

impl ActorClock {
    pub fn new(epoch_ms: i64, cycle_ms: i64) -> Self {
        assert!(cycle_ms > 0, "cycle_ms must be positive, got {cycle_ms}");
        ActorClock { epoch_ms, cycle_ms }
    }

    pub fn epoch_ms(&self) -> i64 {
        self.epoch_ms
    }

    pub fn cycle_ms(&self) -> i64 {
        self.cycle_ms
    }

    /// The cycle containing the instant `millis` (milliseconds since the
    /// Unix epoch, not since `epoch_ms`).
    pub fn cycle(&self, millis: i64) -> i64 {
        (millis - self.epoch_ms).div_euclid(self.cycle_ms)
    }

    pub fn cycle_start_ms(&self, cycle: i64) -> i64 {
        self.epoch_ms + cycle * self.cycle_ms
    }

    pub fn cycle_end_ms(&self, cycle: i64) -> i64 {
        self.cycle_start_ms(cycle + 1) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_boundaries_round_trip() {
        let clock = ActorClock::new(1_000, 500);
        let start = clock.cycle_start_ms(3);
        let end = clock.cycle_end_ms(3);
        assert_eq!(clock.cycle(start), 3);
        assert_eq!(clock.cycle(end), 3);
        assert_eq!(clock.cycle(end + 1), 4);
    }

    #[test]
    fn cycle_before_epoch_is_negative() {
        let clock = ActorClock::new(10_000, 1_000);
        assert_eq!(clock.cycle(9_000), -1);
    }
}
