//! Handlers for the `/admin` resource (user management and user stats).
//!
//! Every handler requires the `admin` role via [`RequireAdmin`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rollcall_core::error::CoreError;
use rollcall_core::types::DbId;
use rollcall_db::models::role::RoleCount;
use rollcall_db::models::user::{CreateUser, UpdateUser, UserResponse};
use rollcall_db::repositories::{RoleRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::handlers::{require_non_blank, validate_input};
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub staff_id: Option<String>,
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
    /// Role name, e.g. `"hod"`.
    pub role: String,
}

/// All fields optional. `password` resets the user's password.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub staff_id: Option<String>,
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: i64,
    pub by_role: Vec<RoleCount>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = find_user_response(&state, id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    let Json(input) = payload?;
    require_non_blank("name", &input.name)?;
    validate_input(&input)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role_id = resolve_role_id(&state, &input.role).await?;
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            staff_id: input.staff_id.map(|s| s.trim().to_string()),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            password_hash,
            role_id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, role = %input.role, "User created");

    let response = find_user_response(&state, user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("User created", response)),
    ))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let Json(input) = payload?;
    validate_input(&input)?;

    let role_id = match input.role.as_deref() {
        Some(role) => Some(resolve_role_id(&state, role).await?),
        None => None,
    };

    let password_hash = match input.password.as_deref() {
        Some(password) => {
            validate_password_strength(password, MIN_PASSWORD_LENGTH)
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
            Some(
                hash_password(password)
                    .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?,
            )
        }
        None => None,
    };

    let update = UpdateUser {
        staff_id: input.staff_id.map(|s| s.trim().to_string()),
        name: input.name.map(|s| s.trim().to_string()),
        email: input.email.map(|s| s.trim().to_string()),
        password_hash,
        role_id,
        is_active: input.is_active,
    };

    UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, admin_id = admin.user_id, "User updated");

    let response = find_user_response(&state, id).await?;
    Ok(Json(ApiResponse::with_message("User updated", response)))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Admins cannot delete their own account.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".into(),
        ));
    }

    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    tracing::info!(user_id = id, admin_id = admin.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/stats/users
pub async fn user_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<ApiResponse<UserStats>>> {
    let total_users = UserRepo::count(&state.pool).await?;
    let by_role = RoleRepo::user_counts(&state.pool).await?;
    Ok(Json(ApiResponse::ok(UserStats {
        total_users,
        by_role,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user_response(state: &AppState, id: DbId) -> AppResult<UserResponse> {
    UserRepo::find_response_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

async fn resolve_role_id(state: &AppState, role: &str) -> AppResult<DbId> {
    RoleRepo::find_by_name(&state.pool, role.trim())
        .await?
        .map(|r| r.id)
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("Unknown role '{role}'"))))
}
