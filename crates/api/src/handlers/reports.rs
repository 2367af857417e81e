//! Handlers for the `/reports` resource: per-student summaries, the
//! low-attendance list, and CSV, Excel and PDF export.

use axum::extract::{Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use rollcall_core::attendance::AttendanceSummary;
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::attendance::{AttendanceFilter, AttendanceWithStudent, StudentTally};
use rollcall_db::repositories::AttendanceRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::export::{self, PdfExportError};
use crate::middleware::auth::AuthUser;
use crate::query::{DateRangeParams, ThresholdParams};
use crate::response::ApiResponse;
use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student_id: DbId,
    pub roll_number: String,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub present: i64,
    pub absent: i64,
    pub total: i64,
    pub percentage: i64,
}

impl From<StudentTally> for StudentReport {
    fn from(t: StudentTally) -> Self {
        let summary = AttendanceSummary::new(t.present, t.absent);
        Self {
            student_id: t.student_id,
            roll_number: t.roll_number,
            name: t.name,
            class_name: t.class_name,
            present: summary.present,
            absent: summary.absent,
            total: summary.total,
            percentage: summary.percentage,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LowAttendanceReport {
    pub threshold: i64,
    pub count: usize,
    pub students: Vec<StudentReport>,
}

/// GET /api/v1/reports/attendance?startDate&endDate&class
pub async fn attendance_report(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<ApiResponse<Vec<StudentReport>>>> {
    let filter = params.to_filter()?;
    let report = AttendanceRepo::student_tallies(&state.pool, &filter)
        .await?
        .into_iter()
        .map(StudentReport::from)
        .collect();
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/v1/reports/low-attendance?threshold&startDate&endDate&class
///
/// Students with at least one record whose percentage is strictly below
/// the threshold.
pub async fn low_attendance(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(threshold): Query<ThresholdParams>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<ApiResponse<LowAttendanceReport>>> {
    let threshold = threshold
        .threshold
        .unwrap_or(state.config.low_attendance_threshold);
    if !(0..=100).contains(&threshold) {
        return Err(AppError::Core(CoreError::Validation(
            "threshold must be between 0 and 100".into(),
        )));
    }

    let filter = params.to_filter()?;
    let students: Vec<StudentReport> = AttendanceRepo::student_tallies(&state.pool, &filter)
        .await?
        .into_iter()
        .map(StudentReport::from)
        .filter(|r| r.total > 0 && r.percentage < threshold)
        .collect();

    Ok(Json(ApiResponse::ok(LowAttendanceReport {
        threshold,
        count: students.len(),
        students,
    })))
}

/// GET /api/v1/reports/export/csv?startDate&endDate&class
pub async fn export_csv(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Response> {
    let (_, rows) = export_rows(&state, &params).await?;
    let body = export::render_csv(&rows)
        .map_err(|e| AppError::InternalError(format!("CSV rendering error: {e}")))?;
    Ok(attachment("text/csv; charset=utf-8", "csv", body))
}

/// GET /api/v1/reports/export/excel?startDate&endDate&class
pub async fn export_excel(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Response> {
    let (filter, rows) = export_rows(&state, &params).await?;
    let body = export::render_xlsx(&rows, &export::period_label(&filter))
        .map_err(|e| AppError::InternalError(format!("Excel rendering error: {e}")))?;
    Ok(attachment(XLSX_CONTENT_TYPE, "xlsx", body))
}

/// GET /api/v1/reports/export/pdf?startDate&endDate&class
///
/// 503 when the configured font family cannot be loaded.
pub async fn export_pdf(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Response> {
    let (filter, rows) = export_rows(&state, &params).await?;
    let period = export::period_label(&filter);
    let generated_at = state.clock.now();
    let fonts = state.config.report_fonts.clone();

    let rendered = tokio::task::spawn_blocking(move || {
        export::render_pdf(&rows, &period, generated_at, &fonts)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("PDF export task failed: {e}")))?;

    let body = match rendered {
        Ok(body) => body,
        Err(err @ PdfExportError::Fonts { .. }) => {
            tracing::warn!(error = %err, "PDF export unavailable");
            return Err(AppError::ServiceUnavailable(
                "PDF export is unavailable: report fonts are not installed".into(),
            ));
        }
        Err(err) => return Err(AppError::InternalError(err.to_string())),
    };
    Ok(attachment("application/pdf", "pdf", body))
}

async fn export_rows(
    state: &AppState,
    params: &DateRangeParams,
) -> AppResult<(AttendanceFilter, Vec<AttendanceWithStudent>)> {
    let filter = params.to_filter()?;
    let rows = AttendanceRepo::list_filtered(&state.pool, &filter).await?;
    Ok((filter, rows))
}

/// A download response named `attendance-report-<unix seconds>.<extension>`.
fn attachment(content_type: &str, extension: &str, body: Vec<u8>) -> Response {
    let filename = format!("attendance-report-{}.{extension}", Utc::now().timestamp());
    (
        [
            (CONTENT_TYPE, content_type.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_row_computes_percentage() {
        let report = StudentReport::from(StudentTally {
            student_id: 3,
            roll_number: "A003".into(),
            name: "Alex".into(),
            class_name: "CSE-A".into(),
            present: 2,
            absent: 1,
        });
        assert_eq!(report.total, 3);
        assert_eq!(report.percentage, 67);
    }
}
