//! Route definitions for the `/reports` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET /attendance       -> attendance_report
/// GET /low-attendance   -> low_attendance (?threshold)
/// GET /export/csv       -> export_csv
/// GET /export/excel     -> export_excel
/// GET /export/pdf       -> export_pdf
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/attendance", get(reports::attendance_report))
        .route("/low-attendance", get(reports::low_attendance))
        .route("/export/csv", get(reports::export_csv))
        .route("/export/excel", get(reports::export_excel))
        .route("/export/pdf", get(reports::export_pdf))
}
