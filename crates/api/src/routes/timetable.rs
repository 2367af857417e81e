//! Route definitions for the `/timetable` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::timetable;
use crate::state::AppState;

/// Routes mounted at `/timetable`.
///
/// ```text
/// GET    /                 -> list_periods
/// POST   /                 -> create_period
/// GET    /my-schedule      -> my_schedule
/// GET    /current-period   -> current_period
/// PUT    /{id}             -> update_period
/// DELETE /{id}             -> delete_period
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(timetable::list_periods).post(timetable::create_period),
        )
        .route("/my-schedule", get(timetable::my_schedule))
        .route("/current-period", get(timetable::current_period))
        .route(
            "/{id}",
            put(timetable::update_period).delete(timetable::delete_period),
        )
}
