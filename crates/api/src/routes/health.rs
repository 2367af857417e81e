//! Liveness endpoint. Reports database reachability and the date the
//! server marks attendance for when a request omits one.

use std::time::Instant;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::NaiveDate;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub db_healthy: bool,
    /// Round trip of the database check.
    pub db_latency_ms: u64,
    /// Today's date according to the server clock.
    pub today: NaiveDate,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let started = Instant::now();
    let db_healthy = rollcall_db::health_check(&state.pool).await.is_ok();
    let db_latency_ms = started.elapsed().as_millis() as u64;

    if !db_healthy {
        tracing::warn!(db_latency_ms, "Health check: database unreachable");
    }

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        db_latency_ms,
        today: state.clock.today(),
    })
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
