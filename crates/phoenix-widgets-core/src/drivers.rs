//! Periodic driver schedule.
//!
//! Drivers are cooperative: nothing runs on its own. The owner calls
//! `due()` with the current time and runs whatever is returned. This keeps
//! the engine single-threaded and lets tests step a manual clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Longest accepted driver period: one day.
pub const MAX_DRIVER_PERIOD_MS: u64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Credits visible time to shown widgets.
    Tick,
    /// Recomputes every relevance score.
    Decay,
    /// Sweeps stale widgets.
    Cleanup,
}

/// Driver periods in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverIntervals {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_decay_ms")]
    pub decay_ms: u64,
    #[serde(default = "default_cleanup_ms")]
    pub cleanup_ms: u64,
}

fn default_tick_ms() -> u64 {
    100
}
fn default_decay_ms() -> u64 {
    60_000
}
fn default_cleanup_ms() -> u64 {
    300_000
}

impl Default for DriverIntervals {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            decay_ms: default_decay_ms(),
            cleanup_ms: default_cleanup_ms(),
        }
    }
}

impl DriverIntervals {
    fn period_ms(&self, kind: DriverKind) -> u64 {
        match kind {
            DriverKind::Tick => self.tick_ms,
            DriverKind::Decay => self.decay_ms,
            DriverKind::Cleanup => self.cleanup_ms,
        }
    }

    /// Period for `kind`, clamped to 1 ms ..= [`MAX_DRIVER_PERIOD_MS`].
    pub fn period(&self, kind: DriverKind) -> Duration {
        Duration::milliseconds(self.period_ms(kind).clamp(1, MAX_DRIVER_PERIOD_MS) as i64)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, kind) in [
            ("drivers.tick_ms", DriverKind::Tick),
            ("drivers.decay_ms", DriverKind::Decay),
            ("drivers.cleanup_ms", DriverKind::Cleanup),
        ] {
            let ms = self.period_ms(kind);
            if ms == 0 || ms > MAX_DRIVER_PERIOD_MS {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("period must be 1-{MAX_DRIVER_PERIOD_MS} ms, got {ms}"),
                });
            }
        }
        Ok(())
    }
}

/// `now + period`, saturating at the latest representable instant.
fn deadline(now: DateTime<Utc>, period: Duration) -> DateTime<Utc> {
    now.checked_add_signed(period).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

const ALL_DRIVERS: [DriverKind; 3] = [DriverKind::Tick, DriverKind::Decay, DriverKind::Cleanup];

/// Next deadline for each driver while running.
#[derive(Debug, Clone)]
pub struct DriverSchedule {
    intervals: DriverIntervals,
    next_due: Option<[DateTime<Utc>; 3]>,
}

impl DriverSchedule {
    pub fn new(intervals: DriverIntervals) -> Self {
        Self {
            intervals,
            next_due: None,
        }
    }

    pub fn intervals(&self) -> &DriverIntervals {
        &self.intervals
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Arm every driver one period after `now`.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.next_due = Some(ALL_DRIVERS.map(|k| deadline(now, self.intervals.period(k))));
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Drivers whose deadline has passed, in tick/decay/cleanup order.
    ///
    /// Each returned driver is re-armed one period after `now`, so a long
    /// gap between polls runs a driver once rather than replaying every
    /// missed period.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<DriverKind> {
        let Some(next_due) = self.next_due.as_mut() else {
            return Vec::new();
        };

        let mut due = Vec::new();
        for (slot, kind) in next_due.iter_mut().zip(ALL_DRIVERS) {
            if now >= *slot {
                due.push(kind);
                *slot = deadline(now, self.intervals.period(kind));
            }
        }
        due
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.next_due.and_then(|d| d.into_iter().min())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn nothing_due_when_stopped() {
        let mut schedule = DriverSchedule::new(DriverIntervals::default());
        assert!(schedule.due(t0() + Duration::hours(1)).is_empty());
    }

    #[test]
    fn drivers_fire_on_their_periods() {
        let mut schedule = DriverSchedule::new(DriverIntervals::default());
        schedule.start(t0());

        assert!(schedule.due(t0() + Duration::milliseconds(50)).is_empty());
        assert_eq!(
            schedule.due(t0() + Duration::milliseconds(100)),
            vec![DriverKind::Tick]
        );
        assert_eq!(
            schedule.due(t0() + Duration::seconds(60)),
            vec![DriverKind::Tick, DriverKind::Decay]
        );
        assert_eq!(
            schedule.due(t0() + Duration::seconds(300)),
            vec![DriverKind::Tick, DriverKind::Decay, DriverKind::Cleanup]
        );
    }

    #[test]
    fn missed_periods_collapse() {
        let mut schedule = DriverSchedule::new(DriverIntervals::default());
        schedule.start(t0());
        let late = t0() + Duration::hours(2);
        assert_eq!(schedule.due(late).len(), 3);
        assert!(schedule.due(late).is_empty());
    }

    #[test]
    fn periods_outside_range_are_rejected() {
        assert!(DriverIntervals::default().validate().is_ok());
        let zero = DriverIntervals {
            tick_ms: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
        let huge = DriverIntervals {
            decay_ms: 9_000_000_000_000_000_000,
            ..Default::default()
        };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn huge_period_is_clamped_when_armed() {
        let intervals = DriverIntervals {
            cleanup_ms: u64::MAX,
            ..Default::default()
        };
        assert_eq!(intervals.period(DriverKind::Cleanup), Duration::days(1));

        let mut schedule = DriverSchedule::new(intervals);
        schedule.start(DateTime::<Utc>::MAX_UTC - Duration::hours(1));
        assert!(schedule.is_running());

        let last = DateTime::<Utc>::MAX_UTC;
        assert_eq!(schedule.due(last).len(), 3);
        assert_eq!(schedule.next_deadline(), Some(last));
    }

    #[test]
    fn stop_disarms() {
        let mut schedule = DriverSchedule::new(DriverIntervals::default());
        schedule.start(t0());
        assert!(schedule.is_running());
        schedule.stop();
        assert!(!schedule.is_running());
        assert!(schedule.next_deadline().is_none());
    }
}
