//! Route definitions for the `/dashboard` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`. Requires authentication.
///
/// ```text
/// GET /   -> dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard::dashboard))
}
