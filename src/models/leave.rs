//! Leave request model and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::date_range;

/// The kind of leave requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Paid leave.
    Paid,
    /// Sick leave.
    Sick,
    /// Unpaid leave.
    Unpaid,
}

impl LeaveType {
    /// All leave types in display order.
    pub const ALL: [LeaveType; 3] = [LeaveType::Paid, LeaveType::Sick, LeaveType::Unpaid];
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveType::Paid => write!(f, "paid"),
            LeaveType::Sick => write!(f, "sick"),
            LeaveType::Unpaid => write!(f, "unpaid"),
        }
    }
}

/// Lifecycle status of a leave request.
///
/// `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Approved; attendance for the range is marked as leave.
    Approved,
    /// Rejected; no attendance side effects.
    Rejected,
}

impl LeaveStatus {
    /// All statuses in display order.
    pub const ALL: [LeaveStatus; 3] = [
        LeaveStatus::Pending,
        LeaveStatus::Approved,
        LeaveStatus::Rejected,
    ];

    /// Returns true if no further transition is permitted.
    pub fn is_terminal(self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

impl std::fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveStatus::Pending => write!(f, "pending"),
            LeaveStatus::Approved => write!(f, "approved"),
            LeaveStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// The outcome an administrator can choose for a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveOutcome {
    /// Approve the request.
    Approved,
    /// Reject the request.
    Rejected,
}

impl From<LeaveOutcome> for LeaveStatus {
    fn from(outcome: LeaveOutcome) -> Self {
        match outcome {
            LeaveOutcome::Approved => LeaveStatus::Approved,
            LeaveOutcome::Rejected => LeaveStatus::Rejected,
        }
    }
}

/// The fields written by a decision, applied only while the request is pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveDecision {
    /// The chosen outcome.
    pub outcome: LeaveOutcome,
    /// The administrator who decided.
    pub approver_id: Uuid,
    /// Optional comment for the employee.
    pub admin_comment: Option<String>,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

/// A leave request submitted by an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Unique identifier.
    pub id: Uuid,
    /// The requesting employee.
    pub employee_id: Uuid,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave (inclusive).
    pub from_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub to_date: NaiveDate,
    /// Why the leave is needed.
    pub reason: String,
    /// Current status.
    pub status: LeaveStatus,
    /// Comment left by the approver.
    #[serde(default)]
    pub admin_comment: Option<String>,
    /// Who decided the request.
    #[serde(default)]
    pub approver_id: Option<Uuid>,
    /// When the request was decided.
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// Every calendar date covered by the request, in order.
    ///
    /// # Example
    ///
    /// ```
    /// use hr_engine::models::{LeaveRequest, LeaveStatus, LeaveType};
    /// use chrono::{NaiveDate, Utc};
    /// use uuid::Uuid;
    ///
    /// let request = LeaveRequest {
    ///     id: Uuid::new_v4(),
    ///     employee_id: Uuid::new_v4(),
    ///     leave_type: LeaveType::Sick,
    ///     from_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
    ///     to_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
    ///     reason: "Flu".to_string(),
    ///     status: LeaveStatus::Pending,
    ///     admin_comment: None,
    ///     approver_id: None,
    ///     decided_at: None,
    ///     created_at: Utc::now(),
    /// };
    /// assert_eq!(request.dates().count(), 3);
    /// ```
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        date_range(self.from_date, self.to_date)
    }

    /// Number of calendar days covered by the request.
    pub fn day_count(&self) -> i64 {
        (self.to_date - self.from_date).num_days() + 1
    }

    /// Applies a decision, returning the decided request.
    pub(crate) fn decided(mut self, decision: &LeaveDecision) -> Self {
        self.status = decision.outcome.into();
        self.approver_id = Some(decision.approver_id);
        self.admin_comment = decision.admin_comment.clone();
        self.decided_at = Some(decision.decided_at);
        self
    }
}
