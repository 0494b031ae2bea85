//! Leave request lifecycle and its cascade onto attendance.
//!
//! ```text
//! pending ──approve──> approved ──cascade──> one `leave` row per date
//!    └─────reject────> rejected
//! ```
//!
//! The decision is a conditional write: only a request that is still
//! pending in the store can be decided. The cascade that follows an approval
//! is a series of independent per-date writes; a failure on one date is
//! recorded in the [`CascadeReport`] and the remaining dates are still
//! written. [`LeaveLifecycle::resume_cascade`] re-drives the same writes.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::validate_range;
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, LeaveDecision, LeaveOutcome, LeaveRequest, LeaveStatus, LeaveType};
use crate::notify::{LeaveDecisionNotification, NotificationQueue};
use crate::store::{Conditional, RecordStore};

use super::attendance::{AttendanceTracker, CascadeWrite};
use super::scoped_employee;

/// Input for a new leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub from_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub to_date: NaiveDate,
    /// Why the leave is requested. Trimmed; must not be empty.
    pub reason: String,
}

/// A date the cascade could not write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeFailure {
    /// The date that was not written.
    pub date: NaiveDate,
    /// The storage error reported for it.
    pub message: String,
}

/// Outcome of applying an approved leave to attendance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    /// Dates that now hold a `leave` row.
    pub written: Vec<NaiveDate>,
    /// Dates left untouched by the cascade policy.
    pub skipped: Vec<NaiveDate>,
    /// Dates that failed and need [`LeaveLifecycle::resume_cascade`].
    pub failed: Vec<CascadeFailure>,
}

impl CascadeReport {
    /// Returns true if every date was handled.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A decided request and, for approvals, the cascade result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    /// The request as stored after the decision.
    pub request: LeaveRequest,
    /// Present when the request was approved.
    pub cascade: Option<CascadeReport>,
}

/// Drives leave submission, decisions and the attendance cascade.
pub struct LeaveLifecycle {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    attendance: Arc<AttendanceTracker>,
    notifications: NotificationQueue,
    max_span_days: u32,
}

impl LeaveLifecycle {
    /// Creates the lifecycle. Approved leave is written through `attendance`.
    ///
    /// `max_span_days` bounds the number of calendar days one request covers.
    pub fn new(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        attendance: Arc<AttendanceTracker>,
        notifications: NotificationQueue,
        max_span_days: u32,
    ) -> Self {
        Self {
            store,
            clock,
            attendance,
            notifications,
            max_span_days,
        }
    }

    /// Files a pending leave request for the caller.
    ///
    /// # Errors
    ///
    /// - `InvalidRange` if `from_date` is after `to_date`
    /// - `Validation` if the range covers more than `max_span_days` dates
    /// - `MissingReason` if the trimmed reason is empty
    /// - `EmployeeNotFound` if the caller has no profile
    ///
    /// Input is validated before the store is touched.
    pub async fn submit(
        &self,
        actor: &Actor,
        application: LeaveApplication,
    ) -> EngineResult<LeaveRequest> {
        validate_range(application.from_date, application.to_date)?;
        let span_days = (application.to_date - application.from_date).num_days() + 1;
        if span_days > i64::from(self.max_span_days) {
            return Err(EngineError::validation(
                "to_date",
                format!(
                    "leave may span at most {} days (got {})",
                    self.max_span_days, span_days
                ),
            ));
        }
        let reason = application.reason.trim();
        if reason.is_empty() {
            return Err(EngineError::MissingReason);
        }

        if self.store.get_employee(actor.id).await?.is_none() {
            return Err(EngineError::EmployeeNotFound { id: actor.id });
        }

        let request = self
            .store
            .insert_leave(LeaveRequest {
                id: Uuid::new_v4(),
                employee_id: actor.id,
                leave_type: application.leave_type,
                from_date: application.from_date,
                to_date: application.to_date,
                reason: reason.to_string(),
                status: LeaveStatus::Pending,
                admin_comment: None,
                approver_id: None,
                decided_at: None,
                created_at: self.clock.now(),
            })
            .await?;

        info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            leave_type = %request.leave_type,
            from = %request.from_date,
            to = %request.to_date,
            "Leave request submitted"
        );
        Ok(request)
    }

    /// Approves or rejects a pending request.
    ///
    /// An approval writes a `leave` attendance row for every date in the
    /// range. Either decision enqueues a notification.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the caller is an administrator
    /// - `LeaveNotFound` if the request does not exist
    /// - `NotPending` if the request was already decided; nothing is changed
    pub async fn decide(
        &self,
        actor: &Actor,
        request_id: Uuid,
        outcome: LeaveOutcome,
        comment: Option<String>,
    ) -> EngineResult<DecisionResult> {
        actor.require_admin("decide leave requests")?;

        let decision = LeaveDecision {
            outcome,
            approver_id: actor.id,
            admin_comment: comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            decided_at: self.clock.now(),
        };

        let request = match self.store.decide_leave_if_pending(request_id, &decision).await? {
            Conditional::Applied(request) => request,
            Conditional::Conflict(current) => {
                return Err(EngineError::NotPending {
                    request_id,
                    status: current.status,
                });
            }
            Conditional::Missing => return Err(EngineError::LeaveNotFound { id: request_id }),
        };

        info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            approver_id = %actor.id,
            status = %request.status,
            "Leave request decided"
        );

        let cascade = match request.status {
            LeaveStatus::Approved => Some(self.cascade(&request).await),
            _ => None,
        };

        self.notify(&request).await;

        Ok(DecisionResult { request, cascade })
    }

    /// Re-applies the attendance cascade of an approved request.
    ///
    /// Converges to the same rows as an uninterrupted approval.
    pub async fn resume_cascade(
        &self,
        actor: &Actor,
        request_id: Uuid,
    ) -> EngineResult<CascadeReport> {
        actor.require_admin("resume a leave cascade")?;

        let request = self
            .store
            .get_leave(request_id)
            .await?
            .ok_or(EngineError::LeaveNotFound { id: request_id })?;
        if request.status != LeaveStatus::Approved {
            return Err(EngineError::NotApproved {
                request_id,
                status: request.status,
            });
        }

        Ok(self.cascade(&request).await)
    }

    /// Fetches a single request.
    pub async fn get(&self, actor: &Actor, request_id: Uuid) -> EngineResult<LeaveRequest> {
        let request = self
            .store
            .get_leave(request_id)
            .await?
            .ok_or(EngineError::LeaveNotFound { id: request_id })?;
        actor.require_self_or_admin(request.employee_id, "view another employee's leave")?;
        Ok(request)
    }

    /// Lists requests newest first.
    ///
    /// Employees only see their own requests.
    pub async fn list(
        &self,
        actor: &Actor,
        employee_id: Option<Uuid>,
    ) -> EngineResult<Vec<LeaveRequest>> {
        let employee_id = scoped_employee(actor, employee_id, "view another employee's leave")?;
        Ok(self.store.list_leaves(employee_id).await?)
    }

    async fn cascade(&self, request: &LeaveRequest) -> CascadeReport {
        let mut report = CascadeReport::default();

        for date in request.dates() {
            match self.attendance.apply_leave(request.employee_id, date).await {
                Ok(CascadeWrite::Written(_)) => report.written.push(date),
                Ok(CascadeWrite::Skipped) => report.skipped.push(date),
                Err(e) => {
                    warn!(
                        request_id = %request.id,
                        employee_id = %request.employee_id,
                        date = %date,
                        error = %e,
                        "Leave cascade write failed"
                    );
                    report.failed.push(CascadeFailure {
                        date,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            request_id = %request.id,
            written = report.written.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Leave cascade applied"
        );
        report
    }

    async fn notify(&self, request: &LeaveRequest) {
        match self.store.get_employee(request.employee_id).await {
            Ok(Some(employee)) => {
                self.notifications
                    .enqueue(LeaveDecisionNotification::new(&employee, request));
            }
            Ok(None) => {
                warn!(
                    request_id = %request.id,
                    employee_id = %request.employee_id,
                    "No employee profile for decided leave, notification skipped"
                );
            }
            Err(e) => {
                warn!(
                    request_id = %request.id,
                    error = %e,
                    "Could not load employee for leave notification"
                );
            }
        }
    }
}
