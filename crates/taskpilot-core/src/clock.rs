//! Injectable date source.
//!
//! Every "today" calculation in the pipeline (daily-view derivation,
//! completion date defaulting, recurrence seeding) goes through a [`Clock`]
//! so that callers can override the current date, e.g. in tests or when
//! replaying a session.

use chrono::{Local, NaiveDate};

/// Source of the current calendar date.
pub trait Clock: Send + Sync {
    /// The current date in the caller's local timezone.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock implementation backed by the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a fixed date. Used by tests and the `--today` override.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_returns_pinned_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let clock = FixedClock(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.today(), date);
    }

    #[test]
    fn test_system_clock_is_plausible() {
        let today = SystemClock.today();
        // Sanity bound only; the precise value depends on the host clock.
        assert!(today > NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }
}
