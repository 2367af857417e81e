//! Timetable day/time validation and the marking-window rule.
//!
//! Period times are stored as `HH:MM` strings. A window-restricted caller may
//! mark attendance only while the current time, truncated to the minute, lies
//! inside `[start, end]` (both ends inclusive) of one of their periods.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Days
// ---------------------------------------------------------------------------

/// Weekday names in calendar order, as stored in `timetable_periods.day`.
pub const VALID_DAYS: &[&str] = &[
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// English weekday name of a date (e.g. `"Monday"`).
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn validate_day(day: &str) -> Result<(), CoreError> {
    if VALID_DAYS.contains(&day) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid day '{day}'. Must be one of: {}",
            VALID_DAYS.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Times
// ---------------------------------------------------------------------------

/// Parse a strict two-digit `HH:MM` clock string.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, CoreError> {
    let invalid = || CoreError::Validation(format!("Invalid time '{value}'. Expected HH:MM"));
    if value.len() != 5 {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| invalid())
}

/// Validate a period's start/end strings and that the period does not run backwards.
pub fn validate_period_times(start: &str, end: &str) -> Result<(), CoreError> {
    let window = PeriodWindow::parse(start, end)?;
    if window.start > window.end {
        return Err(CoreError::Validation(format!(
            "startTime ({start}) must not be after endTime ({end})"
        )));
    }
    Ok(())
}

/// The `[start, end]` clock window of one timetable period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl PeriodWindow {
    pub fn parse(start: &str, end: &str) -> Result<Self, CoreError> {
        Ok(Self {
            start: parse_clock_time(start)?,
            end: parse_clock_time(end)?,
        })
    }

    /// Whether `now`, truncated to the minute, falls inside the window.
    pub fn contains(&self, now: NaiveTime) -> bool {
        let now = truncate_to_minute(now);
        self.start <= now && now <= self.end
    }
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Which weekday a window-restricted mark is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowReference {
    /// Weekday and time of the current wall clock. The date being marked does
    /// not matter.
    #[default]
    WallClock,
    /// Weekday of the date being marked, time of the current wall clock. The
    /// marked date must be today.
    MarkedDate,
}

impl WindowReference {
    /// Parse `wall-clock` or `marked-date`.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim() {
            "wall-clock" => Ok(Self::WallClock),
            "marked-date" => Ok(Self::MarkedDate),
            other => Err(CoreError::Validation(format!(
                "Invalid window reference '{other}'. Must be 'wall-clock' or 'marked-date'"
            ))),
        }
    }
}

/// How the timetable window applies to window-restricted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowPolicy {
    /// Whether bulk marking is also gated by the window.
    pub gate_bulk: bool,
    pub reference: WindowReference,
}

impl WindowPolicy {
    /// The weekday whose periods must be consulted, or `Forbidden` when the
    /// policy rules the mark out before any lookup.
    pub fn reference_day(
        &self,
        now: NaiveDateTime,
        marked_date: NaiveDate,
    ) -> Result<&'static str, CoreError> {
        match self.reference {
            WindowReference::WallClock => Ok(weekday_name(now.date())),
            WindowReference::MarkedDate => {
                if marked_date != now.date() {
                    return Err(CoreError::Forbidden(
                        "You can only mark attendance for today during your assigned period"
                            .into(),
                    ));
                }
                Ok(weekday_name(marked_date))
            }
        }
    }
}
