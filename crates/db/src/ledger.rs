//! Postgres implementation of the reconciler's storage seam.

use chrono::NaiveDate;
use rollcall_core::attendance::{AttendanceStatus, UpsertAction};
use rollcall_core::error::CoreError;
use rollcall_core::reconciler::AttendanceLedger;
use rollcall_core::timetable::PeriodWindow;
use rollcall_core::types::DbId;
use sqlx::PgPool;

use crate::models::attendance::AttendanceRecord;
use crate::repositories::{AttendanceRepo, StudentRepo, TimetableRepo};

/// [`AttendanceLedger`] over the `students`, `attendance` and
/// `timetable_periods` tables.
#[derive(Clone)]
pub struct PgAttendanceLedger {
    pool: PgPool,
}

impl PgAttendanceLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

impl AttendanceLedger for PgAttendanceLedger {
    type Record = AttendanceRecord;

    async fn student_exists(&self, student_id: DbId) -> Result<bool, CoreError> {
        StudentRepo::exists(&self.pool, student_id)
            .await
            .map_err(storage)
    }

    async fn teacher_periods(
        &self,
        teacher_id: DbId,
        day: &str,
    ) -> Result<Vec<PeriodWindow>, CoreError> {
        let periods = TimetableRepo::list_for_teacher_on_day(&self.pool, teacher_id, day)
            .await
            .map_err(storage)?;

        // Times are validated on write; a row that still fails to parse is skipped.
        Ok(periods
            .iter()
            .filter_map(|p| match PeriodWindow::parse(&p.start_time, &p.end_time) {
                Ok(window) => Some(window),
                Err(e) => {
                    tracing::warn!(period_id = p.id, error = %e, "Unparseable period times");
                    None
                }
            })
            .collect())
    }

    async fn upsert(
        &self,
        student_id: DbId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<(AttendanceRecord, UpsertAction), CoreError> {
        let row = AttendanceRepo::upsert(&self.pool, student_id, date, status.as_str())
            .await
            .map_err(storage)?;
        let action = if row.inserted {
            UpsertAction::Created
        } else {
            UpsertAction::Updated
        };
        Ok((row.record, action))
    }
}
