//! Attendance status values, the percentage rule, and bulk-result types.

use std::fmt;

use chrono::NaiveDate;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const STATUS_PRESENT: &str = "Present";
pub const STATUS_ABSENT: &str = "Absent";

/// Allowed status values, in the exact casing stored in the `attendance` table.
pub const VALID_STATUSES: &[&str] = &[STATUS_PRESENT, STATUS_ABSENT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Parse a status string. Matching is exact and case-sensitive.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            STATUS_PRESENT => Ok(Self::Present),
            STATUS_ABSENT => Ok(Self::Absent),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => STATUS_PRESENT,
            Self::Absent => STATUS_ABSENT,
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Wire format for calendar dates (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        CoreError::Validation(format!("Invalid date '{value}'. Expected YYYY-MM-DD"))
    })
}

/// Validate that `start <= end` for an inclusive date range.
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
    if start > end {
        return Err(CoreError::Validation(format!(
            "startDate ({start}) must not be after endDate ({end})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Percentage
// ---------------------------------------------------------------------------

/// `round(present / total * 100)` with half-up rounding; `0` when `total == 0`.
///
/// The denominator is the student's own number of marked days, not calendar days.
pub fn attendance_percentage(present: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (present * 200 + total) / (total * 2)
}

/// Present/absent roll-up for one student or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub present: i64,
    pub absent: i64,
    pub total: i64,
    pub percentage: i64,
}

impl AttendanceSummary {
    pub fn new(present: i64, absent: i64) -> Self {
        let total = present + absent;
        Self {
            present,
            absent,
            total,
            percentage: attendance_percentage(present, total),
        }
    }
}

// ---------------------------------------------------------------------------
// Upsert and bulk results
// ---------------------------------------------------------------------------

/// Whether an upsert inserted a new row or changed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

/// A bulk-item field as the client sent it.
///
/// Deserialization never fails: a JSON value of the wrong type becomes
/// [`ItemField::Malformed`] and is rejected later, for that item only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ItemField<T> {
    #[default]
    Missing,
    Malformed,
    Given(T),
}

impl<T> From<T> for ItemField<T> {
    fn from(value: T) -> Self {
        Self::Given(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ItemField<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Given(T),
            Other(IgnoredAny),
        }

        Ok(match Option::<Raw<T>>::deserialize(deserializer)? {
            None => Self::Missing,
            Some(Raw::Given(value)) => Self::Given(value),
            Some(Raw::Other(_)) => Self::Malformed,
        })
    }
}

/// One entry of a bulk-mark request.
///
/// Any JSON value deserializes into a `BulkItem`, so a missing or mistyped
/// field fails only its own item. An entry that is not an object has both
/// fields malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkItem {
    pub student_id: ItemField<DbId>,
    pub status: ItemField<String>,
}

impl BulkItem {
    pub fn new(student_id: DbId, status: impl Into<String>) -> Self {
        Self {
            student_id: ItemField::Given(student_id),
            status: ItemField::Given(status.into()),
        }
    }
}

impl<'de> Deserialize<'de> for BulkItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Entry {
            #[serde(default)]
            student_id: ItemField<DbId>,
            #[serde(default)]
            status: ItemField<String>,
        }

        Ok(match ItemField::<Entry>::deserialize(deserializer)? {
            ItemField::Given(entry) => Self {
                student_id: entry.student_id,
                status: entry.status,
            },
            ItemField::Missing | ItemField::Malformed => Self {
                student_id: ItemField::Malformed,
                status: ItemField::Malformed,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSuccess {
    pub student_id: DbId,
    pub action: UpsertAction,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkFailure {
    pub student_id: Option<DbId>,
    pub error: String,
}

pub type ItemOutcome = Result<MarkSuccess, MarkFailure>;

/// Aggregated outcome of a bulk mark, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub succeeded: Vec<MarkSuccess>,
    pub failed: Vec<MarkFailure>,
}

impl BatchResult {
    pub fn push(&mut self, outcome: ItemOutcome) {
        match outcome {
            Ok(success) => self.succeeded.push(success),
            Err(failure) => self.failed.push(failure),
        }
    }
}

impl FromIterator<ItemOutcome> for BatchResult {
    fn from_iter<I: IntoIterator<Item = ItemOutcome>>(iter: I) -> Self {
        let mut result = Self::default();
        for outcome in iter {
            result.push(outcome);
        }
        result
    }
}
