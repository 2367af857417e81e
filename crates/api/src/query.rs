//! Query-string parameter types shared across handlers.
//!
//! Dates arrive as strings and are parsed here so a malformed value yields
//! the standard 400 JSON error rather than an extractor rejection.

use chrono::NaiveDate;
use rollcall_core::attendance::{parse_date, validate_date_range};
use rollcall_core::error::CoreError;
use rollcall_db::models::attendance::AttendanceFilter;
use serde::Deserialize;

/// `?startDate=&endDate=&class=`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub class: Option<String>,
}

impl DateRangeParams {
    /// Parse into a filter, rejecting malformed dates and reversed ranges.
    pub fn to_filter(&self) -> Result<AttendanceFilter, CoreError> {
        let start_date = parse_optional_date(self.start_date.as_deref())?;
        let end_date = parse_optional_date(self.end_date.as_deref())?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            validate_date_range(start, end)?;
        }
        Ok(AttendanceFilter {
            start_date,
            end_date,
            class_name: non_empty(self.class.as_deref()),
        })
    }

    /// Like [`to_filter`](Self::to_filter) but both dates are mandatory.
    pub fn to_required_filter(&self) -> Result<AttendanceFilter, CoreError> {
        if self.start_date.is_none() || self.end_date.is_none() {
            return Err(CoreError::Validation(
                "startDate and endDate are required".into(),
            ));
        }
        self.to_filter()
    }
}

/// `?class=`
#[derive(Debug, Default, Deserialize)]
pub struct ClassParams {
    pub class: Option<String>,
}

impl ClassParams {
    pub fn class_name(&self) -> Option<&str> {
        self.class.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// `?date=`
#[derive(Debug, Default, Deserialize)]
pub struct DateParams {
    pub date: Option<String>,
}

/// `?threshold=`
#[derive(Debug, Default, Deserialize)]
pub struct ThresholdParams {
    pub threshold: Option<i64>,
}

pub fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, CoreError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(v) => parse_date(v).map(Some),
        None => Ok(None),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
