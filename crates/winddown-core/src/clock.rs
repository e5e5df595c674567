//! Wall-clock sources for the break timer.
//!
//! The timer never reads the system time directly; it asks a [`Clock`].
//! [`ManualClock`] lets tests and the `simulate` command step through hours
//! of coding in microseconds.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A shared clock that only moves when told to.
///
/// Clones observe the same time, so a test can keep one handle while the
/// timer owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now = *now + by;
    }

    /// Advance by a fractional number of minutes, to millisecond precision.
    pub fn advance_minutes(&self, minutes: f64) {
        self.advance(minutes_to_duration(minutes));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Convert fractional minutes into a chrono duration (millisecond precision).
pub fn minutes_to_duration(minutes: f64) -> Duration {
    Duration::milliseconds((minutes * 60_000.0).round() as i64)
}

/// Minutes elapsed from `since` to `now`; negative if `since` lies ahead.
pub fn minutes_between(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - since).num_milliseconds() as f64 / 60_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_clones_share_time() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let other = clock.clone();
        clock.advance_minutes(1.5);
        assert_eq!(other.now(), start + Duration::seconds(90));
    }

    #[test]
    fn minutes_between_handles_future_marker() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let later = start + Duration::minutes(20);
        assert_eq!(minutes_between(start, later), 20.0);
        assert_eq!(minutes_between(later, start), -20.0);
    }
}
