//! Wall-clock abstraction used for "today" defaults and period-window checks.

use chrono::{NaiveDate, NaiveDateTime};

/// Source of the current local date and time.
pub trait Clock: Send + Sync {
    /// Current local wall-clock time (no time zone attached).
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The server's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock frozen at a single instant. Used by tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Build from a date and an `HH:MM` time.
    ///
    /// # Panics
    ///
    /// Panics if the date or time is invalid.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        let dt = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("FixedClock::at requires a valid date and time");
        Self(dt)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
