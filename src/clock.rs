//! Wall-clock access.
//!
//! Calendar days are taken in UTC, so "today" flips at UTC midnight on
//! every device.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn yesterday(&self) -> NaiveDate {
        self.today().pred_opt().unwrap_or(NaiveDate::MIN)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Clock pinned to midday of the given calendar day.
    pub fn on(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .map_or_else(Utc::now, |dt| dt.and_utc());
        Self::new(noon)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *crate::safe_lock(&self.now, "FixedClock") = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = crate::safe_lock(&self.now, "FixedClock");
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *crate::safe_lock(&self.now, "FixedClock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_fixed_clock_today_and_yesterday() {
        let clock = FixedClock::on(date("2026-03-01"));
        assert_eq!(clock.today(), date("2026-03-01"));
        assert_eq!(clock.yesterday(), date("2026-02-28"));
    }

    #[test]
    fn test_fixed_clock_advance_crosses_midnight() {
        let clock = FixedClock::on(date("2026-01-05"));
        clock.advance(Duration::hours(13));
        assert_eq!(clock.today(), date("2026-01-06"));
    }

    #[test]
    fn test_system_clock_is_recent() {
        let clock = SystemClock;
        assert!(clock.today() > date("2024-01-01"));
    }
}
