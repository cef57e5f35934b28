use std::collections::{HashMap, HashSet};

use crate::error::{ControlPlaneError, Result};
use crate::id::ReservationId;

#[derive(Debug, Clone)]
struct Entry {
    start: i64,
    end: i64,
    reservation: ReservationId,
    resource_type: Option<String>,
}

/// Validity-interval index answering "which reservations are active at time
/// t?" Maintains three parallel structures that must always agree on
/// membership and size: a list sorted by `end`, a set, and an id->entry map.
///
/// Grounded directly on the testbed's `ReservationHoldings`: insertion keeps
/// the list sorted by binary-search position (the Rust analogue of
/// `bisect.insort`), and intersection queries scan outward from that
/// position instead of the whole list.
#[derive(Debug, Default, Clone)]
pub struct ReservationHoldings {
    list: Vec<Entry>,
    set: HashSet<ReservationId>,
    map: HashMap<ReservationId, usize>,
}

impl ReservationHoldings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `r` over `[start, end]` (closed interval). If `r` is already
    /// present this is an extension: `entry.start` is retained and
    /// `entry.end` updated to `end`, provided the previous end is within 1ms
    /// of the new start; otherwise the call is rejected and the existing
    /// entry is left untouched.
    pub fn add(&mut self, reservation: ReservationId, start: i64, end: i64, resource_type: Option<String>) -> Result<()> {
        if start > end {
            return Err(ControlPlaneError::Validation(format!("holdings interval start {start} must be <= end {end}")));
        }

        let retained_start = if let Some(&idx) = self.map.get(&reservation) {
            let existing = &self.list[idx];
            if (start - existing.end).abs() > 1 {
                return Err(ControlPlaneError::Validation(format!(
                    "extension for {reservation} must start within 1ms of previous end {}, got {start}",
                    existing.end
                )));
            }
            let retained = existing.start;
            self.remove(reservation);
            retained
        } else {
            start
        };

        let entry = Entry { start: retained_start, end, reservation, resource_type };
        let pos = self.list.partition_point(|e| e.end < entry.end);
        self.list.insert(pos, entry);
        self.set.insert(reservation);
        self.reindex_from(pos);
        Ok(())
    }

    fn reindex_from(&mut self, from: usize) {
        for idx in from..self.list.len() {
            self.map.insert(self.list[idx].reservation, idx);
        }
    }

    /// Returns every reservation whose interval contains `time_ms`,
    /// optionally filtered by resource type. Correct independent of
    /// insertion order: scans outward from the binary-search position of
    /// `time_ms` among end times.
    pub fn get(&self, time_ms: i64, resource_type: Option<&str>) -> HashSet<ReservationId> {
        let start_idx = self.list.partition_point(|e| e.end < time_ms);
        self.list[start_idx..]
            .iter()
            .filter(|e| e.start <= time_ms && time_ms <= e.end)
            .filter(|e| resource_type.is_none() || e.resource_type.as_deref() == resource_type)
            .map(|e| e.reservation)
            .collect()
    }

    pub fn get_all(&self) -> HashSet<ReservationId> {
        self.set.clone()
    }

    pub fn remove(&mut self, reservation: ReservationId) {
        if let Some(idx) = self.map.remove(&reservation) {
            self.list.remove(idx);
            self.set.remove(&reservation);
            self.reindex_from(idx);
        }
    }

    /// Removes every entry with `end_ms <= time_ms`.
    pub fn tick(&mut self, time_ms: i64) {
        let cutoff = self.list.partition_point(|e| e.end <= time_ms);
        for entry in &self.list[..cutoff] {
            self.set.remove(&entry.reservation);
            self.map.remove(&entry.reservation);
        }
        self.list.drain(..cutoff);
        self.reindex_from(0);
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    #[cfg(test)]
    fn invariants_hold(&self) -> bool {
        self.list.len() == self.set.len() && self.list.len() == self.map.len() && self.list.iter().all(|e| self.set.contains(&e.reservation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_at_closed_interval_boundaries() {
        let mut h = ReservationHoldings::new();
        let r = ReservationId::new();
        h.add(r, 10, 20, None).unwrap();
        assert!(h.get(10, None).contains(&r));
        assert!(h.get(20, None).contains(&r));
        assert!(!h.get(9, None).contains(&r));
        assert!(!h.get(21, None).contains(&r));
    }

    #[test]
    fn intersection_sizes_match_s2_scenario() {
        let mut h = ReservationHoldings::new();
        for end_cycle in [5, 6, 7, 8, 9, 10] {
            let r = ReservationId::new();
            h.add(r, end_cycle - 5, end_cycle, None).unwrap();
        }
        let expected = [1, 2, 3, 4, 5, 6, 5, 4, 3, 2, 1, 0, 0];
        for (point, &want) in expected.iter().enumerate() {
            assert_eq!(h.get(point as i64, None).len(), want, "mismatch at point {point}");
        }
    }

    #[test]
    fn tick_removes_expired_and_preserves_invariants() {
        let mut h = ReservationHoldings::new();
        for end_cycle in [5, 6, 7, 8, 9, 10] {
            let r = ReservationId::new();
            h.add(r, end_cycle - 5, end_cycle, None).unwrap();
        }
        for i in 5..9 {
            h.tick(i);
            assert!(h.invariants_hold());
        }
    }

    #[test]
    fn extension_within_one_ms_succeeds_gap_fails() {
        let mut h = ReservationHoldings::new();
        let r = ReservationId::new();
        h.add(r, 0, 100, None).unwrap();
        h.add(r, 101, 200, None).unwrap();
        assert_eq!(h.get(0, None).len(), 1);
        assert!(h.get(150, None).contains(&r));

        let mut h2 = ReservationHoldings::new();
        let r2 = ReservationId::new();
        h2.add(r2, 0, 100, None).unwrap();
        assert!(h2.add(r2, 105, 200, None).is_err());
    }

    #[test]
    fn add_then_remove_leaves_no_trace() {
        let mut h = ReservationHoldings::new();
        let r = ReservationId::new();
        h.add(r, 0, 10, None).unwrap();
        h.remove(r);
        assert!(h.is_empty());
        assert!(h.invariants_hold());
    }

    #[test]
    fn zero_reservations_queries_are_empty() {
        let h = ReservationHoldings::new();
        assert!(h.get(0, None).is_empty());
        assert!(h.get_all().is_empty());
    }
}
