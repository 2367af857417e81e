//! Handlers for the `/timetable` resource.
//!
//! Writes require `admin`, `hod` or `principal`. Any authenticated caller can
//! read the full timetable, their own schedule, and their current period.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::timetable::{validate_day, validate_period_times, weekday_name, PeriodWindow};
use rollcall_core::types::DbId;
use rollcall_db::models::timetable::{
    CreateTimetablePeriod, TimetablePeriod, TimetablePeriodWithTeacher, UpdateTimetablePeriod,
};
use rollcall_db::repositories::{TimetableRepo, UserRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::require_non_blank;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireTimetableManager;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPeriod {
    pub in_period: bool,
    pub period: Option<TimetablePeriod>,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/timetable
pub async fn list_periods(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<TimetablePeriodWithTeacher>>>> {
    let periods = TimetableRepo::list_with_teacher(&state.pool).await?;
    Ok(Json(ApiResponse::ok(periods)))
}

/// GET /api/v1/timetable/my-schedule
pub async fn my_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<TimetablePeriod>>>> {
    let periods = TimetableRepo::list_for_teacher(&state.pool, auth.user_id).await?;
    Ok(Json(ApiResponse::ok(periods)))
}

/// GET /api/v1/timetable/current-period
///
/// The caller's period containing the current time today, if any. Uses the
/// same inclusive, minute-truncated window as attendance marking.
pub async fn current_period(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<CurrentPeriod>>> {
    let now = state.clock.now();
    let day = weekday_name(now.date());
    let periods = TimetableRepo::list_for_teacher_on_day(&state.pool, auth.user_id, day).await?;

    let period = periods.into_iter().find(|p| {
        PeriodWindow::parse(&p.start_time, &p.end_time)
            .map(|w| w.contains(now.time()))
            .unwrap_or(false)
    });

    Ok(Json(ApiResponse::ok(CurrentPeriod {
        in_period: period.is_some(),
        period,
    })))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/timetable
pub async fn create_period(
    State(state): State<AppState>,
    RequireTimetableManager(auth): RequireTimetableManager,
    payload: Result<Json<CreateTimetablePeriod>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<TimetablePeriod>>)> {
    let Json(input) = payload?;
    require_non_blank("subject", &input.subject)?;
    require_non_blank("className", &input.class_name)?;
    validate_period_fields(&input.day, input.period_number, &input.start_time, &input.end_time)?;
    ensure_teacher_exists(&state, input.teacher_id).await?;

    let period = TimetableRepo::create(&state.pool, &input).await?;

    tracing::info!(
        period_id = period.id,
        teacher_id = period.teacher_id,
        day = %period.day,
        user_id = auth.user_id,
        "Timetable period created",
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Period added", period)),
    ))
}

/// PUT /api/v1/timetable/{id}
///
/// The merged result of the stored row and the update is validated as a whole.
pub async fn update_period(
    State(state): State<AppState>,
    RequireTimetableManager(auth): RequireTimetableManager,
    Path(id): Path<DbId>,
    payload: Result<Json<UpdateTimetablePeriod>, JsonRejection>,
) -> AppResult<Json<ApiResponse<TimetablePeriod>>> {
    let Json(input) = payload?;
    let existing = TimetableRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Timetable period",
            id,
        }))?;

    if let Some(subject) = &input.subject {
        require_non_blank("subject", subject)?;
    }
    if let Some(class_name) = &input.class_name {
        require_non_blank("className", class_name)?;
    }
    validate_period_fields(
        input.day.as_deref().unwrap_or(&existing.day),
        input.period_number.unwrap_or(existing.period_number),
        input.start_time.as_deref().unwrap_or(&existing.start_time),
        input.end_time.as_deref().unwrap_or(&existing.end_time),
    )?;
    if let Some(teacher_id) = input.teacher_id {
        ensure_teacher_exists(&state, teacher_id).await?;
    }

    let period = TimetableRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Timetable period",
            id,
        }))?;

    tracing::info!(period_id = id, user_id = auth.user_id, "Timetable period updated");
    Ok(Json(ApiResponse::with_message("Period updated", period)))
}

/// DELETE /api/v1/timetable/{id}
pub async fn delete_period(
    State(state): State<AppState>,
    RequireTimetableManager(auth): RequireTimetableManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TimetableRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Timetable period",
            id,
        }));
    }
    tracing::info!(period_id = id, user_id = auth.user_id, "Timetable period deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_period_fields(
    day: &str,
    period_number: i32,
    start_time: &str,
    end_time: &str,
) -> Result<(), CoreError> {
    validate_day(day)?;
    if period_number < 1 {
        return Err(CoreError::Validation(
            "periodNumber must be at least 1".into(),
        ));
    }
    validate_period_times(start_time, end_time)
}

async fn ensure_teacher_exists(state: &AppState, teacher_id: DbId) -> AppResult<()> {
    if UserRepo::find_by_id(&state.pool, teacher_id).await?.is_none() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Teacher with id {teacher_id} does not exist"
        ))));
    }
    Ok(())
}
