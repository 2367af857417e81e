//! Handlers for the `/attendance` resource: marking, queries, stats and deletion.
//!
//! Marking goes through the [`Reconciler`](rollcall_core::reconciler::Reconciler),
//! which owns role classification and the timetable window. Everything else
//! is a thin read over [`AttendanceRepo`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rollcall_core::attendance::{
    attendance_percentage, parse_date, AttendanceSummary, BulkItem, MarkFailure, MarkSuccess,
    UpsertAction, STATUS_PRESENT,
};
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::attendance::{AttendanceRecord, AttendanceWithStudent};
use rollcall_db::models::student::Student;
use rollcall_db::repositories::{AttendanceRepo, StudentRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireUnrestricted;
use crate::query::{parse_optional_date, ClassParams, DateParams, DateRangeParams};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /attendance/mark`. Fields are optional so that a missing
/// value produces a field-specific 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkRequest {
    pub student_id: Option<DbId>,
    pub status: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkMarkRequest {
    pub students: Option<Vec<BulkItem>>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkMarkResponse {
    pub success: usize,
    pub failed: usize,
    pub results: Vec<MarkSuccess>,
    pub errors: Vec<MarkFailure>,
}

#[derive(Debug, Serialize)]
pub struct StudentAttendance {
    pub student: Student,
    pub records: Vec<AttendanceRecord>,
    pub summary: AttendanceSummary,
}

#[derive(Debug, Serialize)]
pub struct MissingStudents {
    pub date: NaiveDate,
    pub count: usize,
    pub students: Vec<Student>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub date: NaiveDate,
    pub total_students: i64,
    pub marked: i64,
    pub present: i64,
    pub absent: i64,
    pub unmarked: i64,
    /// Present share of marked students.
    pub percentage: i64,
}

#[derive(Debug, Serialize)]
pub struct ClassStats {
    #[serde(rename = "class")]
    pub class_name: String,
    pub students: i64,
    pub present: i64,
    pub absent: i64,
    pub total: i64,
    pub percentage: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletedCount {
    pub deleted: u64,
}

// ---------------------------------------------------------------------------
// Marking
// ---------------------------------------------------------------------------

/// POST /api/v1/attendance/mark
pub async fn mark(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<MarkRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<AttendanceRecord>>> {
    let Json(input) = payload?;
    let student_id = input
        .student_id
        .ok_or_else(|| AppError::BadRequest("studentId is required".into()))?;
    let status = input
        .status
        .ok_or_else(|| AppError::BadRequest("status is required".into()))?;
    let date = parse_optional_date(input.date.as_deref())?;

    let ledger = state.ledger();
    let (record, action) = state
        .reconciler(&ledger)
        .mark(&auth.caller(), student_id, &status, date)
        .await?;

    let message = match action {
        UpsertAction::Created => "Attendance marked successfully",
        UpsertAction::Updated => "Attendance updated successfully",
    };
    Ok(Json(ApiResponse::with_message(message, record)))
}

/// POST /api/v1/attendance/mark-bulk
///
/// Per-student failures are reported in `errors` and do not fail the request.
pub async fn mark_bulk(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<BulkMarkRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<BulkMarkResponse>>> {
    let Json(input) = payload?;
    let items = input
        .students
        .ok_or_else(|| AppError::BadRequest("students must be a non-empty list".into()))?;
    let date = parse_optional_date(input.date.as_deref())?;

    let ledger = state.ledger();
    let batch = state
        .reconciler(&ledger)
        .mark_bulk(&auth.caller(), &items, date)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        succeeded = batch.succeeded.len(),
        failed = batch.failed.len(),
        "Bulk attendance marked",
    );
    Ok(Json(ApiResponse::ok(BulkMarkResponse {
        success: batch.succeeded.len(),
        failed: batch.failed.len(),
        results: batch.succeeded,
        errors: batch.failed,
    })))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/attendance/today
pub async fn today(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<AttendanceWithStudent>>>> {
    let records = AttendanceRepo::list_by_date(&state.pool, state.clock.today()).await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// GET /api/v1/attendance/date/{date}
pub async fn by_date(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(date): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceWithStudent>>>> {
    let date = parse_date(&date)?;
    let records = AttendanceRepo::list_by_date(&state.pool, date).await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// GET /api/v1/attendance/range?startDate&endDate&class
pub async fn range(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceWithStudent>>>> {
    let filter = params.to_required_filter()?;
    let records = AttendanceRepo::list_filtered(&state.pool, &filter).await?;
    Ok(Json(ApiResponse::ok(records)))
}

/// GET /api/v1/attendance/student/{student_id}
pub async fn for_student(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(student_id): Path<DbId>,
) -> AppResult<Json<ApiResponse<StudentAttendance>>> {
    let student = StudentRepo::find_by_id(&state.pool, student_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id: student_id,
        }))?;
    let records = AttendanceRepo::list_for_student(&state.pool, student_id).await?;

    let present = records.iter().filter(|r| r.status == STATUS_PRESENT).count() as i64;
    let absent = records.len() as i64 - present;

    Ok(Json(ApiResponse::ok(StudentAttendance {
        student,
        records,
        summary: AttendanceSummary::new(present, absent),
    })))
}

/// GET /api/v1/attendance/missing/{date}?class
pub async fn missing(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(date): Path<String>,
    Query(params): Query<ClassParams>,
) -> AppResult<Json<ApiResponse<MissingStudents>>> {
    let date = parse_date(&date)?;
    let students = AttendanceRepo::missing_students(&state.pool, date, params.class_name()).await?;
    Ok(Json(ApiResponse::ok(MissingStudents {
        date,
        count: students.len(),
        students,
    })))
}

/// GET /api/v1/attendance/stats/overview?date
pub async fn stats_overview(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<DateParams>,
) -> AppResult<Json<ApiResponse<OverviewStats>>> {
    let date = parse_optional_date(params.date.as_deref())?.unwrap_or_else(|| state.clock.today());
    let tally = AttendanceRepo::day_tally(&state.pool, date).await?;

    Ok(Json(ApiResponse::ok(OverviewStats {
        date,
        total_students: tally.total_students,
        marked: tally.marked,
        present: tally.present,
        absent: tally.absent,
        unmarked: (tally.total_students - tally.marked).max(0),
        percentage: attendance_percentage(tally.present, tally.marked),
    })))
}

/// GET /api/v1/attendance/stats/by-class?startDate&endDate
pub async fn stats_by_class(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<ApiResponse<Vec<ClassStats>>>> {
    let filter = params.to_filter()?;
    let stats = AttendanceRepo::class_tallies(&state.pool, &filter)
        .await?
        .into_iter()
        .map(|t| {
            let summary = AttendanceSummary::new(t.present, t.absent);
            ClassStats {
                class_name: t.class_name,
                students: t.students,
                present: summary.present,
                absent: summary.absent,
                total: summary.total,
                percentage: summary.percentage,
            }
        })
        .collect();
    Ok(Json(ApiResponse::ok(stats)))
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// DELETE /api/v1/attendance/{id}
pub async fn delete_record(
    State(state): State<AppState>,
    RequireUnrestricted(auth): RequireUnrestricted,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AttendanceRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Attendance record",
            id,
        }));
    }
    tracing::info!(attendance_id = id, user_id = auth.user_id, "Attendance record deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/attendance/date/{date}
pub async fn delete_by_date(
    State(state): State<AppState>,
    RequireUnrestricted(auth): RequireUnrestricted,
    Path(date): Path<String>,
) -> AppResult<Json<ApiResponse<DeletedCount>>> {
    let date = parse_date(&date)?;
    let deleted = AttendanceRepo::delete_by_date(&state.pool, date).await?;
    tracing::info!(%date, deleted, user_id = auth.user_id, "Attendance for date deleted");
    Ok(Json(ApiResponse::with_message(
        format!("Deleted {deleted} attendance records"),
        DeletedCount { deleted },
    )))
}
