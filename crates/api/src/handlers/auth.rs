//! Handlers for the `/auth` resource (login, register, refresh, logout).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use rollcall_core::error::CoreError;
use rollcall_core::roles::ROLE_TEACHER;
use rollcall_core::types::DbId;
use rollcall_db::models::refresh_session::NewRefreshSession;
use rollcall_db::models::user::{CreateUser, User};
use rollcall_db::repositories::{RefreshSessionRepo, RoleRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::handlers::{require_non_blank, validate_input};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Consecutive failed logins before the account is locked.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub staff_id: String,
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: DbId,
    pub staff_id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let Json(input) = payload?;

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        let new_count = user.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after repeated failed logins");
        }

        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let response = create_auth_response(&state, &user, &role_name).await?;

    tracing::info!(user_id = user.id, role = %role_name, "User logged in");
    Ok(Json(ApiResponse::with_message("Login successful", response)))
}

/// POST /api/v1/auth/register
///
/// Self-service signup. New accounts always get the `teacher` role.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let Json(input) = payload?;
    require_non_blank("staffId", &input.staff_id)?;
    require_non_blank("name", &input.name)?;
    validate_input(&input)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let email = input.email.trim();
    if UserRepo::find_by_email(&state.pool, email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already registered".into(),
        )));
    }

    let role = RoleRepo::find_by_name(&state.pool, ROLE_TEACHER)
        .await?
        .ok_or_else(|| AppError::InternalError("teacher role is not seeded".into()))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            staff_id: Some(input.staff_id.trim().to_string()),
            name: input.name.trim().to_string(),
            email: email.to_string(),
            password_hash,
            role_id: role.id,
        },
    )
    .await?;

    let response = create_auth_response(&state, &user, &role.name).await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Registration successful", response)),
    ))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a live refresh token for a new pair. The old session is revoked
/// and linked to its replacement; a token can be exchanged only once.
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let Json(input) = payload?;
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = RefreshSessionRepo::find_live_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(invalid_refresh_token)?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let issued = issue_tokens(&state, &user, &role_name)?;

    let rotated = RefreshSessionRepo::rotate(&state.pool, session.id, &issued.session).await?;
    if rotated.is_none() {
        tracing::warn!(user_id = user.id, session_id = session.id, "Refresh token reused");
        return Err(invalid_refresh_token());
    }

    Ok(Json(ApiResponse::ok(issued.response)))
}

/// POST /api/v1/auth/logout
///
/// Revoke every session of the caller. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = RefreshSessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A freshly minted token pair and the session row that will hold it.
struct IssuedTokens {
    response: AuthResponse,
    session: NewRefreshSession,
}

fn issue_tokens(state: &AppState, user: &User, role: &str) -> AppResult<IssuedTokens> {
    let access_token = generate_access_token(user.id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    Ok(IssuedTokens {
        response: AuthResponse {
            access_token,
            refresh_token: refresh_plaintext,
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
            user: UserInfo {
                id: user.id,
                staff_id: user.staff_id.clone(),
                name: user.name.clone(),
                email: user.email.clone(),
                role: role.to_string(),
            },
        },
        session: NewRefreshSession {
            user_id: user.id,
            token_hash: refresh_hash,
            expires_at,
        },
    })
}

/// Issue tokens and persist a new refresh session.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    role: &str,
) -> AppResult<AuthResponse> {
    let issued = issue_tokens(state, user, role)?;
    RefreshSessionRepo::create(&state.pool, &issued.session).await?;
    Ok(issued.response)
}

fn invalid_refresh_token() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid or expired refresh token".into(),
    ))
}
