//! Time source for the engine.
//!
//! Operations never read the wall clock directly so that tests can pin
//! "now" and "today".

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

/// Supplies the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the calendar date at the given UTC offset.
    fn today(&self, offset: FixedOffset) -> NaiveDate {
        self.now().with_timezone(&offset).date_naive()
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that returns a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock pinned at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = now;
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(Duration::hours(8));
        assert_eq!(clock.now(), start + Duration::hours(8));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_today_respects_offset() {
        // 20:00 UTC on the 10th is already the 11th at UTC+05:30
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 10, 20, 0, 0).unwrap());
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();

        assert_eq!(clock.today(ist), NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
        assert_eq!(clock.today(utc), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }
}
