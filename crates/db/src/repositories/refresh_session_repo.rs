//! Repository for `refresh_sessions`: issue, look up, rotate and revoke
//! refresh tokens by their stored hash.

use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::refresh_session::{NewRefreshSession, RefreshSession};

const COLUMNS: &str = "id, user_id, token_hash, expires_at, revoked_at, replaced_by, created_at";

pub struct RefreshSessionRepo;

impl RefreshSessionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &NewRefreshSession,
    ) -> Result<RefreshSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO refresh_sessions (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// The live session holding `token_hash`, if any.
    pub async fn find_live_by_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM refresh_sessions
             WHERE token_hash = $1 AND revoked_at IS NULL AND expires_at > NOW()"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke session `old_id` and insert its replacement in one transaction.
    ///
    /// Returns `None` without inserting when `old_id` is no longer live, so
    /// two requests racing on the same refresh token get one new session
    /// between them.
    pub async fn rotate(
        pool: &PgPool,
        old_id: DbId,
        replacement: &NewRefreshSession,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let revoked = sqlx::query(
            "UPDATE refresh_sessions SET revoked_at = NOW()
             WHERE id = $1 AND revoked_at IS NULL AND expires_at > NOW()",
        )
        .bind(old_id)
        .execute(&mut *tx)
        .await?;
        if revoked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO refresh_sessions (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, RefreshSession>(&query)
            .bind(replacement.user_id)
            .bind(&replacement.token_hash)
            .bind(replacement.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE refresh_sessions SET replaced_by = $2 WHERE id = $1")
            .bind(old_id)
            .bind(session.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(session))
    }

    /// Revoke every live session of a user, returning how many were revoked.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_sessions SET revoked_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > NOW()",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that expired or were revoked more than `retain_days` ago.
    pub async fn purge_stale(pool: &PgPool, retain_days: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM refresh_sessions
             WHERE COALESCE(revoked_at, expires_at) < NOW() - make_interval(days => $1)",
        )
        .bind(retain_days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
