//! Staff user model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full row from the `users` table.
///
/// Carries the password hash, so it is never serialized. Handlers respond
/// with [`UserResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub staff_id: Option<String>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A user joined with its role name.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub staff_id: Option<String>,
    pub name: String,
    pub email: String,
    pub role: String,
    pub role_id: DbId,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

pub struct CreateUser {
    pub staff_id: Option<String>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Default)]
pub struct UpdateUser {
    pub staff_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role_id: Option<DbId>,
    pub is_active: Option<bool>,
}
