//! Role-based access control extractors.
//!
//! Each wraps [`AuthUser`] and rejects with 403 when the role does not
//! qualify. Attendance marking is not gated here: the reconciler applies the
//! configured role groups itself.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rollcall_core::error::CoreError;
use rollcall_core::roles::{ROLE_ADMIN, TIMETABLE_MANAGER_ROLES};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Any role in the configured unrestricted group. Guards roster writes and
/// attendance deletion.
pub struct RequireUnrestricted(pub AuthUser);

impl FromRequestParts<AppState> for RequireUnrestricted {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !state.config.marking.roles.is_unrestricted(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(format!(
                "Role '{}' may not perform this action",
                user.role
            ))));
        }
        Ok(RequireUnrestricted(user))
    }
}

pub struct RequireTimetableManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireTimetableManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !TIMETABLE_MANAGER_ROLES.contains(&user.role.as_str()) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin, HOD or Principal role required".into(),
            )));
        }
        Ok(RequireTimetableManager(user))
    }
}
