//! Attendance rows, joined views and aggregate rows.

use chrono::NaiveDate;
use rollcall_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `attendance` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: DbId,
    pub student_id: DbId,
    pub date: NaiveDate,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of the atomic upsert: the stored row plus whether it was inserted.
#[derive(Debug, Clone, FromRow)]
pub struct UpsertedRecord {
    #[sqlx(flatten)]
    pub record: AttendanceRecord,
    pub inserted: bool,
}

/// An attendance record with the roster fields callers display.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceWithStudent {
    pub id: DbId,
    pub student_id: DbId,
    pub date: NaiveDate,
    pub status: String,
    pub roll_number: String,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
}

/// Present/absent counts for one student.
#[derive(Debug, Clone, FromRow)]
pub struct StudentTally {
    pub student_id: DbId,
    pub roll_number: String,
    pub name: String,
    pub class_name: String,
    pub present: i64,
    pub absent: i64,
}

/// Marking counts for a single date.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct DayTally {
    pub total_students: i64,
    pub marked: i64,
    pub present: i64,
    pub absent: i64,
}

/// Per-class roster size and marking counts.
#[derive(Debug, Clone, FromRow)]
pub struct ClassTally {
    pub class_name: String,
    pub students: i64,
    pub present: i64,
    pub absent: i64,
}

/// Optional filters shared by range and report queries. `None` means unbounded.
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub class_name: Option<String>,
}
