//! Handler for the role-aware landing dashboard.
//!
//! What a caller sees depends on their role:
//!
//! - unrestricted markers get the whole roster;
//! - window-restricted markers (teachers) get the first
//!   [`WINDOW_RESTRICTED_ROSTER_LIMIT`] students;
//! - any other role gets no students;
//! - roles in [`DASHBOARD_STATS_ROLES`] also get today's totals.

use axum::extract::State;
use axum::Json;
use rollcall_core::attendance::attendance_percentage;
use rollcall_core::error::CoreError;
use rollcall_core::roles::{MarkerClass, DASHBOARD_STATS_ROLES};
use rollcall_core::types::DbId;
use rollcall_db::models::student::Student;
use rollcall_db::repositories::{AttendanceRepo, StudentRepo, UserRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Roster size shown to window-restricted callers.
pub const WINDOW_RESTRICTED_ROSTER_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct DashboardUser {
    pub id: DbId,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: i64,
    /// Students with a record for today, either status.
    pub today_attendance: i64,
    pub present: i64,
    /// Marked share of the roster.
    pub attendance_rate: i64,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: DashboardUser,
    pub students: Vec<Student>,
    pub stats: Option<DashboardStats>,
}

/// GET /api/v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Dashboard>>> {
    let user = UserRepo::find_response_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    let students = match state.config.marking.roles.classify(&auth.role) {
        Some(MarkerClass::Unrestricted) => StudentRepo::list(&state.pool, None).await?,
        Some(MarkerClass::WindowRestricted) => {
            StudentRepo::list_first(&state.pool, WINDOW_RESTRICTED_ROSTER_LIMIT).await?
        }
        None => Vec::new(),
    };

    let stats = if DASHBOARD_STATS_ROLES.contains(&auth.role.as_str()) {
        let tally = AttendanceRepo::day_tally(&state.pool, state.clock.today()).await?;
        Some(DashboardStats {
            total_students: tally.total_students,
            today_attendance: tally.marked,
            present: tally.present,
            attendance_rate: attendance_percentage(tally.marked, tally.total_students),
        })
    } else {
        None
    };

    Ok(Json(ApiResponse::ok(Dashboard {
        user: DashboardUser {
            id: user.id,
            name: user.name,
            role: user.role,
        },
        students,
        stats,
    })))
}
