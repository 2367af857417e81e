//! Timetable period model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from `timetable_periods`.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetablePeriod {
    pub id: DbId,
    pub day: String,
    pub period_number: i32,
    pub subject: String,
    pub class_name: String,
    pub teacher_id: DbId,
    pub start_time: String,
    pub end_time: String,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A period joined with its teacher's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetablePeriodWithTeacher {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub period: TimetablePeriod,
    pub teacher_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTimetablePeriod {
    pub day: String,
    pub period_number: i32,
    pub subject: String,
    pub class_name: String,
    pub teacher_id: DbId,
    pub start_time: String,
    pub end_time: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTimetablePeriod {
    pub day: Option<String>,
    pub period_number: Option<i32>,
    pub subject: Option<String>,
    pub class_name: Option<String>,
    pub teacher_id: Option<DbId>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub color: Option<String>,
}
