/// A subscriber notified of each advancing cycle by the tick service.
///
/// Implementations typically forward `external_tick` straight into their
/// actor's event processor as a `TickEvent`, never process it inline — the
/// tick service's own task must stay a cheap fan-out, not a place where
/// actor logic runs.
pub trait Tickable: Send + Sync {
    fn external_tick(&self, cycle: i64);

    fn name(&self) -> &str;
}
