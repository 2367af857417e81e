//! Repository for the `users` table.

use rollcall_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User, UserResponse};

const COLUMNS: &str = "id, staff_id, name, email, password_hash, role_id, is_active, \
                       last_login_at, failed_login_count, locked_until, created_at, updated_at";

/// Columns of [`UserResponse`], selected from `users u JOIN roles r`.
const RESPONSE_COLUMNS: &str = "u.id, u.staff_id, u.name, u.email, r.name AS role, u.role_id, \
                                u.is_active, u.last_login_at, u.created_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (staff_id, name, email, password_hash, role_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.staff_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// A user with its role name resolved.
    pub async fn find_response_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.id = $1"
        );
        sqlx::query_as::<_, UserResponse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All users with role names, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<UserResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             ORDER BY u.created_at DESC, u.id DESC"
        );
        sqlx::query_as::<_, UserResponse>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Apply the non-`None` fields of `input`. Returns `None` if the user does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                staff_id = COALESCE($2, staff_id),
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                password_hash = COALESCE($5, password_hash),
                role_id = COALESCE($6, role_id),
                is_active = COALESCE($7, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.staff_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a user. Their sessions and timetable periods cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Reset the failure counter, clear any lock, and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
