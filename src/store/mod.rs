//! Record store seam.
//!
//! The engine talks to an external record store through [`RecordStore`].
//! Every method is a single-row atomic operation keyed by the entity's
//! natural key. Nothing here spans rows: the leave cascade is a sequence of
//! independent attendance upserts issued by the caller.
//!
//! State transitions that must not be applied twice (leave decisions, the
//! paid transition, edits of a paid payroll) are conditional writes that
//! report a [`Conditional::Conflict`] instead of overwriting.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AttendanceRecord, Employee, LeaveDecision, LeaveRequest, PayrollKey, PayrollRecord,
};

pub use memory::MemoryStore;

/// Failures reported by a record store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or timed out.
    #[error("record store unavailable: {message}")]
    Unavailable {
        /// A description of the failure.
        message: String,
    },

    /// A uniqueness constraint was violated.
    #[error("constraint violated: {message}")]
    Constraint {
        /// A description of the violated constraint.
        message: String,
    },
}

/// A type alias for Results that return StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a conditional single-row write.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditional<T> {
    /// The precondition held and the row was written; carries the new row.
    Applied(T),
    /// The precondition failed; carries the row as currently stored.
    Conflict(T),
    /// No row exists for the key.
    Missing,
}

/// Filter for attendance listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceQuery {
    /// Restrict to one employee.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
    /// First date (inclusive).
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Last date (inclusive).
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl AttendanceQuery {
    /// Returns true if the record satisfies the filter.
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.employee_id.is_none_or(|id| id == record.employee_id)
            && self.from.is_none_or(|from| record.date >= from)
            && self.to.is_none_or(|to| record.date <= to)
    }
}

/// Filter for payroll listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollQuery {
    /// Restrict to one employee.
    #[serde(default)]
    pub employee_id: Option<Uuid>,
    /// Restrict to one month.
    #[serde(default)]
    pub month: Option<u32>,
    /// Restrict to one year.
    #[serde(default)]
    pub year: Option<i32>,
}

impl PayrollQuery {
    /// Returns true if the record satisfies the filter.
    pub fn matches(&self, record: &PayrollRecord) -> bool {
        self.employee_id.is_none_or(|id| id == record.employee_id)
            && self.month.is_none_or(|month| month == record.month)
            && self.year.is_none_or(|year| year == record.year)
    }
}

/// Per-row atomic access to the persisted entities.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts a new employee. Fails with `Constraint` on a duplicate email or code.
    async fn insert_employee(&self, employee: Employee) -> StoreResult<Employee>;

    /// Overwrites an existing employee row.
    async fn update_employee(&self, employee: Employee) -> StoreResult<Employee>;

    /// Fetches an employee by id.
    async fn get_employee(&self, id: Uuid) -> StoreResult<Option<Employee>>;

    /// Lists all employees ordered by name.
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;

    /// Fetches the attendance row for an employee and date.
    async fn get_attendance(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Creates or overwrites the row keyed by `(employee_id, date)`.
    ///
    /// An existing row keeps its id.
    async fn upsert_attendance(&self, record: AttendanceRecord) -> StoreResult<AttendanceRecord>;

    /// Lists attendance rows ordered by date then employee.
    async fn list_attendance(&self, query: &AttendanceQuery) -> StoreResult<Vec<AttendanceRecord>>;

    /// Inserts a new leave request.
    async fn insert_leave(&self, request: LeaveRequest) -> StoreResult<LeaveRequest>;

    /// Fetches a leave request by id.
    async fn get_leave(&self, id: Uuid) -> StoreResult<Option<LeaveRequest>>;

    /// Applies a decision only if the request is still pending.
    async fn decide_leave_if_pending(
        &self,
        id: Uuid,
        decision: &LeaveDecision,
    ) -> StoreResult<Conditional<LeaveRequest>>;

    /// Lists leave requests, newest first.
    async fn list_leaves(&self, employee_id: Option<Uuid>) -> StoreResult<Vec<LeaveRequest>>;

    /// Fetches the payroll row for a period.
    async fn get_payroll(&self, key: PayrollKey) -> StoreResult<Option<PayrollRecord>>;

    /// Inserts the row, or overwrites the amounts of an existing pending row.
    ///
    /// A paid row is left untouched and returned as a conflict.
    async fn upsert_payroll_unless_paid(
        &self,
        record: PayrollRecord,
    ) -> StoreResult<Conditional<PayrollRecord>>;

    /// Marks a pending row as paid at `paid_at`.
    async fn mark_payroll_paid_if_pending(
        &self,
        key: PayrollKey,
        paid_at: DateTime<Utc>,
    ) -> StoreResult<Conditional<PayrollRecord>>;

    /// Lists payroll rows ordered by year, month, then employee.
    async fn list_payroll(&self, query: &PayrollQuery) -> StoreResult<Vec<PayrollRecord>>;
}
