//! Route definitions for the `/attendance` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// Routes mounted at `/attendance`.
///
/// ```text
/// POST   /mark                    -> mark
/// POST   /mark-bulk               -> mark_bulk
/// GET    /today                   -> today
/// GET    /date/{date}             -> by_date
/// DELETE /date/{date}             -> delete_by_date
/// GET    /range                   -> range (?startDate&endDate&class)
/// GET    /student/{student_id}    -> for_student
/// GET    /missing/{date}          -> missing (?class)
/// GET    /stats/overview          -> stats_overview (?date)
/// GET    /stats/by-class          -> stats_by_class (?startDate&endDate)
/// DELETE /{id}                    -> delete_record
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mark", post(attendance::mark))
        .route("/mark-bulk", post(attendance::mark_bulk))
        .route("/today", get(attendance::today))
        .route(
            "/date/{date}",
            get(attendance::by_date).delete(attendance::delete_by_date),
        )
        .route("/range", get(attendance::range))
        .route("/student/{student_id}", get(attendance::for_student))
        .route("/missing/{date}", get(attendance::missing))
        .route("/stats/overview", get(attendance::stats_overview))
        .route("/stats/by-class", get(attendance::stats_by_class))
        .route("/{id}", delete(attendance::delete_record))
}
