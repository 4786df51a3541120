//! Time sources.
//!
//! Every score and deadline in the engine reads time through [`Clock`], so
//! tests can swap in a [`ManualClock`] and step it deterministically instead
//! of racing the wall clock.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, Timelike, Utc};

pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Hour of day (0-23) used for contextual relevance.
    fn hour_of_day(&self) -> u32 {
        self.now().with_timezone(&Local).hour()
    }
}

/// Wall clock, local hour of day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the engine. The hour of day is taken from the UTC instant.
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

    /// Move the clock forward (or backward for a negative duration).
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn hour_of_day(&self) -> u32 {
        self.now().hour()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn hour_of_day(&self) -> u32 {
        (**self).hour_of_day()
    }
}

/// Hours elapsed from `earlier` to `later`, never negative.
pub(crate) fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let ms = (later - earlier).num_milliseconds().max(0);
    ms as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn manual_clock_clones_share_time() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();

        handle.advance(Duration::minutes(90));
        assert_eq!(clock.now(), start + Duration::minutes(90));
        assert_eq!(clock.hour_of_day(), 10);
    }

    #[test]
    fn hours_between_clamps_negative() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(hours_between(t + Duration::hours(1), t), 0.0);
        assert_eq!(hours_between(t, t + Duration::minutes(30)), 0.5);
    }
}
