use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ControlPlaneError, Result};

/// A reservation's time window, plus the bookkeeping needed to extend it.
///
/// `new_start` tracks where the *next* extension would begin: the instant
/// after the current `end`. Kept separate from `start` because a reservation
/// that has been extended several times still needs to remember its original
/// start for reporting, while extension math always pivots off the most
/// recent `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    new_start: DateTime<Utc>,
}

impl Term {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end <= start {
            return Err(ControlPlaneError::Validation(format!("term end {end} must be after start {start}")));
        }
        Ok(Term { start, end, new_start: start })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn new_start(&self) -> DateTime<Utc> {
        self.new_start
    }

    /// Produces the extended term: the new window starts the instant after
    /// the current end and runs through `new_end`.
    pub fn extend(&self, new_end: DateTime<Utc>) -> Result<Self> {
        let next_start = self.end + chrono::Duration::milliseconds(1);
        if new_end <= next_start {
            return Err(ControlPlaneError::Validation(format!("extension end {new_end} must be after {next_start}")));
        }
        Ok(Term { start: self.start, end: new_end, new_start: next_start })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn rejects_inverted_window() {
        assert!(Term::new(ts(10), ts(5)).is_err());
    }

    #[test]
    fn extend_pivots_off_end() {
        let term = Term::new(ts(0), ts(100)).unwrap();
        let extended = term.extend(ts(200)).unwrap();
        assert_eq!(extended.start(), ts(0));
        assert_eq!(extended.end(), ts(200));
        assert!(extended.new_start() > term.end());
    }
}
