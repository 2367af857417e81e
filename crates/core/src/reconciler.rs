//! Attendance marking: authorization, upsert by natural key, and bulk
//! reconciliation.
//!
//! The [`Reconciler`] owns every business rule of marking and delegates
//! storage to an [`AttendanceLedger`]. A ledger must implement `upsert` as a
//! single atomic insert-or-update keyed on `(student_id, date)`.

use std::future::Future;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};

use crate::attendance::{
    AttendanceStatus, BatchResult, BulkItem, ItemField, ItemOutcome, MarkFailure, MarkSuccess,
    UpsertAction, VALID_STATUSES,
};
use crate::clock::Clock;
use crate::error::CoreError;
use crate::roles::{Caller, MarkerClass, RoleGroups};
use crate::timetable::{PeriodWindow, WindowPolicy};
use crate::types::DbId;

/// Default per-item time limit for bulk marking.
pub const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(5);

/// Message returned when a window-restricted caller is outside their period.
pub const OUTSIDE_PERIOD_MESSAGE: &str = "You can only mark attendance during your assigned period";

/// Storage operations the reconciler needs.
pub trait AttendanceLedger: Send + Sync {
    /// The stored attendance row handed back to callers.
    type Record: Send;

    fn student_exists(
        &self,
        student_id: DbId,
    ) -> impl Future<Output = Result<bool, CoreError>> + Send;

    /// Period windows assigned to `teacher_id` on `day` (a weekday name).
    fn teacher_periods(
        &self,
        teacher_id: DbId,
        day: &str,
    ) -> impl Future<Output = Result<Vec<PeriodWindow>, CoreError>> + Send;

    /// Insert the record for `(student_id, date)` or overwrite its status.
    fn upsert(
        &self,
        student_id: DbId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> impl Future<Output = Result<(Self::Record, UpsertAction), CoreError>> + Send;
}

/// Tunable marking rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkingPolicy {
    pub roles: RoleGroups,
    pub window: WindowPolicy,
    /// Upper bound on each bulk item's storage work. `None` disables the limit.
    pub item_timeout: Option<Duration>,
}

impl Default for MarkingPolicy {
    fn default() -> Self {
        Self {
            roles: RoleGroups::default(),
            window: WindowPolicy::default(),
            item_timeout: Some(DEFAULT_ITEM_TIMEOUT),
        }
    }
}

pub struct Reconciler<'a, L, C: ?Sized> {
    ledger: &'a L,
    clock: &'a C,
    policy: &'a MarkingPolicy,
}

impl<'a, L, C> Reconciler<'a, L, C>
where
    L: AttendanceLedger,
    C: Clock + ?Sized,
{
    pub fn new(ledger: &'a L, clock: &'a C, policy: &'a MarkingPolicy) -> Self {
        Self {
            ledger,
            clock,
            policy,
        }
    }

    /// Mark one student's status for `date` (today when `None`).
    ///
    /// Fails fast: validation, authorization, a missing student, or a storage
    /// error all abort with no write.
    pub async fn mark(
        &self,
        caller: &Caller,
        student_id: DbId,
        status: &str,
        date: Option<NaiveDate>,
    ) -> Result<(L::Record, UpsertAction), CoreError> {
        let status = AttendanceStatus::parse(status)?;
        let now = self.clock.now();
        let date = date.unwrap_or_else(|| now.date());

        if self.classify(caller)? == MarkerClass::WindowRestricted {
            self.check_window(caller, now, date).await?;
        }

        if !self.ledger.student_exists(student_id).await? {
            return Err(CoreError::NotFound {
                entity: "Student",
                id: student_id,
            });
        }

        let (record, action) = self.ledger.upsert(student_id, date, status).await?;

        tracing::info!(
            student_id,
            %date,
            %status,
            ?action,
            user_id = caller.id,
            "Attendance marked",
        );

        Ok((record, action))
    }

    /// Mark many students for one shared date.
    ///
    /// Each item is validated and stored independently; a failing item is
    /// recorded in [`BatchResult::failed`] and processing continues. Only an
    /// empty list or an unauthorized caller fails the whole batch.
    pub async fn mark_bulk(
        &self,
        caller: &Caller,
        items: &[BulkItem],
        date: Option<NaiveDate>,
    ) -> Result<BatchResult, CoreError> {
        if items.is_empty() {
            return Err(CoreError::Validation(
                "students must be a non-empty list".into(),
            ));
        }

        let now = self.clock.now();
        let date = date.unwrap_or_else(|| now.date());

        let class = self.classify(caller)?;
        if class == MarkerClass::WindowRestricted && self.policy.window.gate_bulk {
            self.check_window(caller, now, date).await?;
        }

        let mut result = BatchResult::default();
        for item in items {
            let outcome = self.mark_item(item, date).await;
            if let Err(failure) = &outcome {
                tracing::warn!(
                    student_id = ?failure.student_id,
                    error = %failure.error,
                    %date,
                    "Bulk attendance item failed",
                );
            }
            result.push(outcome);
        }

        tracing::info!(
            %date,
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            user_id = caller.id,
            "Bulk attendance marked",
        );

        Ok(result)
    }

    async fn mark_item(&self, item: &BulkItem, date: NaiveDate) -> ItemOutcome {
        let student_id = match item.student_id {
            ItemField::Given(id) => id,
            ItemField::Missing => return Err(unidentified_failure("studentId is required")),
            ItemField::Malformed => {
                return Err(unidentified_failure("studentId must be an integer"))
            }
        };
        let status = match &item.status {
            ItemField::Given(raw) => {
                AttendanceStatus::parse(raw).map_err(|e| item_failure(student_id, &e))?
            }
            ItemField::Missing => {
                return Err(item_failure(
                    student_id,
                    &CoreError::Validation("status is required".into()),
                ))
            }
            ItemField::Malformed => {
                return Err(item_failure(
                    student_id,
                    &CoreError::Validation(format!(
                        "status must be one of: {}",
                        VALID_STATUSES.join(", ")
                    )),
                ))
            }
        };

        let work = async {
            if !self.ledger.student_exists(student_id).await? {
                return Err(CoreError::NotFound {
                    entity: "Student",
                    id: student_id,
                });
            }
            self.ledger.upsert(student_id, date, status).await
        };

        let stored = match self.policy.item_timeout {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(stored) => stored,
                Err(_) => Err(CoreError::Storage(format!(
                    "timed out after {}ms",
                    limit.as_millis()
                ))),
            },
            None => work.await,
        };

        match stored {
            Ok((_, action)) => Ok(MarkSuccess {
                student_id,
                action,
                status,
            }),
            Err(e) => Err(item_failure(student_id, &e)),
        }
    }

    fn classify(&self, caller: &Caller) -> Result<MarkerClass, CoreError> {
        self.policy.roles.classify(&caller.role).ok_or_else(|| {
            CoreError::Forbidden(format!(
                "Role '{}' is not allowed to mark attendance",
                caller.role
            ))
        })
    }

    async fn check_window(
        &self,
        caller: &Caller,
        now: NaiveDateTime,
        date: NaiveDate,
    ) -> Result<(), CoreError> {
        let day = self.policy.window.reference_day(now, date)?;
        let periods = self.ledger.teacher_periods(caller.id, day).await?;
        if periods.iter().any(|p| p.contains(now.time())) {
            Ok(())
        } else {
            tracing::debug!(user_id = caller.id, day, time = %now.time(), "Outside assigned period");
            Err(CoreError::Forbidden(OUTSIDE_PERIOD_MESSAGE.into()))
        }
    }
}

fn unidentified_failure(error: &str) -> MarkFailure {
    MarkFailure {
        student_id: None,
        error: error.to_string(),
    }
}

/// Turn an item error into the caller-facing failure entry.
///
/// Storage details are logged by the caller of this function, never returned.
fn item_failure(student_id: DbId, err: &CoreError) -> MarkFailure {
    let error = match err {
        CoreError::NotFound { .. } => "Student not found".to_string(),
        CoreError::Validation(msg) => msg.clone(),
        CoreError::Storage(msg) | CoreError::Internal(msg) => {
            tracing::error!(student_id, error = %msg, "Storage failure while marking attendance");
            "Failed to save attendance".to_string()
        }
        other => other.to_string(),
    };
    MarkFailure {
        student_id: Some(student_id),
        error,
    }
}
