use std::sync::Arc;

use rollcall_core::clock::Clock;
use rollcall_core::reconciler::Reconciler;
use rollcall_db::ledger::PgAttendanceLedger;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: the pool and everything else are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub pool: rollcall_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Source of "today" and of the time used for period-window checks.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn ledger(&self) -> PgAttendanceLedger {
        PgAttendanceLedger::new(self.pool.clone())
    }

    /// A reconciler over `ledger` using the configured marking policy and clock.
    pub fn reconciler<'a>(
        &'a self,
        ledger: &'a PgAttendanceLedger,
    ) -> Reconciler<'a, PgAttendanceLedger, dyn Clock> {
        Reconciler::new(ledger, self.clock.as_ref(), &self.config.marking)
    }
}
