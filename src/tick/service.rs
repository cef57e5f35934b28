use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::info;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::clock::ActorClock;

use super::tickable::Tickable;

/// Drives the clock and fans `external_tick` out to every registered
/// subscriber, either on a background timer (`start`) or on demand
/// (`tick`, for test harnesses).
///
/// Grounded on the testbed's `KernelTick`: a single background task computes
/// `cycle = clock.cycle(now_ms)` and collapses duplicate cycles (a wake-up
/// that lands on the same cycle as the previous one is dropped) rather than
/// re-delivering it.
pub struct TickService {
    clock: ActorClock,
    cycle_ms: u64,
    subscribers: Mutex<Vec<Arc<dyn Tickable>>>,
    last_delivered: AtomicI64,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TickService {
    pub fn new(clock: ActorClock, cycle_ms: u64) -> Arc<Self> {
        Arc::new(TickService { clock, cycle_ms, subscribers: Mutex::new(Vec::new()), last_delivered: AtomicI64::new(-1), worker: Mutex::new(None) })
    }

    /// Safe to call at any time, concurrently with a fan-out in progress.
    pub fn register(&self, tickable: Arc<dyn Tickable>) {
        self.subscribers.lock().unwrap().push(tickable);
    }

    pub fn unregister(&self, name: &str) {
        self.subscribers.lock().unwrap().retain(|t| t.name() != name);
    }

    /// Computes the current cycle from wall time and fans it out, skipping
    /// delivery entirely if the cycle has not advanced since the last
    /// delivery.
    fn next_tick(&self, now_ms: i64) {
        let cycle = self.clock.cycle(now_ms);
        if cycle <= self.last_delivered.load(Ordering::SeqCst) {
            return;
        }
        self.last_delivered.store(cycle, Ordering::SeqCst);
        info!("clock interrupt: now={now_ms} cycle={cycle}");
        for tickable in self.subscribers.lock().unwrap().iter() {
            info!("delivering external tick to {} cycle={cycle}", tickable.name());
            tickable.external_tick(cycle);
        }
    }

    /// Manual mode: computes "now" from the clock's own epoch plus the next
    /// un-delivered cycle's start, so tests can drive cycles deterministically
    /// without a wall-clock dependency.
    pub fn tick(&self) {
        let next_cycle = self.last_delivered.load(Ordering::SeqCst).saturating_add(1);
        let now_ms = self.clock.cycle_start_ms(next_cycle);
        self.next_tick(now_ms);
    }

    pub fn tick_to(&self, now_ms: i64) {
        self.next_tick(now_ms);
    }

    /// Starts the automatic background timer. Idempotent: calling `start`
    /// while already running is a no-op.
    pub fn start(self: &Arc<Self>, now_ms_fn: impl Fn() -> i64 + Send + Sync + 'static) {
        let mut worker = self.worker.lock().unwrap();
        if worker.is_some() {
            return;
        }
        let service = Arc::clone(self);
        let period = Duration::from_millis(self.cycle_ms.max(1));
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let now_ms = now_ms_fn();
                service.next_tick(now_ms);
            }
        });
        *worker = Some(handle);
    }

    /// Idempotent; aborts the background task if one is running.
    pub fn stop(&self) {
        if let Some(handle) = self.worker.lock().unwrap().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingTickable {
        name: String,
        count: AtomicUsize,
        seen_cycles: Mutex<Vec<i64>>,
    }

    impl Tickable for CountingTickable {
        fn external_tick(&self, cycle: i64) {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.seen_cycles.lock().unwrap().push(cycle);
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    #[test]
    fn manual_tick_delivers_monotonic_cycles() {
        let clock = ActorClock::new(0, 10);
        let service = TickService::new(clock, 10);
        let sub = Arc::new(CountingTickable { name: "sub".into(), count: AtomicUsize::new(0), seen_cycles: Mutex::new(Vec::new()) });
        service.register(sub.clone());

        service.tick();
        service.tick();
        service.tick();

        let seen = sub.seen_cycles.lock().unwrap();
        assert_eq!(*seen, vec![0, 1, 2]);
    }

    #[test]
    fn duplicate_cycle_is_collapsed() {
        let clock = ActorClock::new(0, 100);
        let service = TickService::new(clock, 100);
        let sub = Arc::new(CountingTickable { name: "sub".into(), count: AtomicUsize::new(0), seen_cycles: Mutex::new(Vec::new()) });
        service.register(sub.clone());

        service.tick_to(50);
        service.tick_to(60);
        service.tick_to(150);

        assert_eq!(*sub.seen_cycles.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn unregister_is_safe_after_removal() {
        let clock = ActorClock::new(0, 10);
        let service = TickService::new(clock, 10);
        let sub = Arc::new(CountingTickable { name: "sub".into(), count: AtomicUsize::new(0), seen_cycles: Mutex::new(Vec::new()) });
        service.register(sub.clone());
        service.unregister("sub");
        service.tick();
        assert!(sub.seen_cycles.lock().unwrap().is_empty());
    }
}
