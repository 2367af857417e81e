//! Refresh-token sessions.

use rollcall_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from `refresh_sessions`. A session is live while `revoked_at` is
/// unset and `expires_at` is in the future.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    /// The session issued when this one was rotated.
    pub replaced_by: Option<DbId>,
    pub created_at: Timestamp,
}

impl RefreshSession {
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct NewRefreshSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn session(expires_in: Duration, revoked: bool) -> RefreshSession {
        let now = Utc::now();
        RefreshSession {
            id: 1,
            user_id: 1,
            token_hash: "h".into(),
            expires_at: now + expires_in,
            revoked_at: revoked.then_some(now),
            replaced_by: None,
            created_at: now,
        }
    }

    #[test]
    fn liveness_needs_unrevoked_and_unexpired() {
        let now = Utc::now();
        assert!(session(Duration::hours(1), false).is_live(now));
        assert!(!session(Duration::hours(1), true).is_live(now));
        assert!(!session(Duration::hours(-1), false).is_live(now));
    }
}
