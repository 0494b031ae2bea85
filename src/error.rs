//! Error types for the HR consistency engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the attendance, leave and payroll operations can report.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LeaveStatus, PayrollKey};
use crate::store::StoreError;

/// The main error type for the HR consistency engine.
///
/// Variants fall into the categories reported by [`EngineError::kind`]:
/// validation problems are detected before any storage call, state conflicts
/// abort the operation without touching the row, and storage failures are
/// surfaced as a generic, retryable failure.
///
/// # Example
///
/// ```
/// use hr_engine::error::EngineError;
///
/// let error = EngineError::MissingReason;
/// assert_eq!(error.to_string(), "A reason is required for a leave request");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An input field failed validation.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A leave request starts after it ends.
    #[error("Invalid date range: from {from} is after to {to}")]
    InvalidRange {
        /// The requested first day.
        from: NaiveDate,
        /// The requested last day.
        to: NaiveDate,
    },

    /// A leave request was submitted without a reason.
    #[error("A reason is required for a leave request")]
    MissingReason,

    /// The employee already has an open check-in for the day.
    #[error("Already checked in on {date}")]
    AlreadyCheckedIn {
        /// The attendance date.
        date: NaiveDate,
    },

    /// The employee already checked in and out for the day.
    #[error("Attendance for {date} is already closed")]
    AlreadyCheckedOut {
        /// The attendance date.
        date: NaiveDate,
    },

    /// Check-out was requested without an open check-in.
    #[error("No open check-in on {date}")]
    NoOpenCheckIn {
        /// The attendance date.
        date: NaiveDate,
    },

    /// A leave decision was attempted on a request that is no longer pending.
    #[error("Leave request {request_id} is {status}, not pending")]
    NotPending {
        /// The leave request.
        request_id: Uuid,
        /// The status the request currently holds.
        status: LeaveStatus,
    },

    /// The leave cascade can only be re-applied for an approved request.
    #[error("Leave request {request_id} is {status}, not approved")]
    NotApproved {
        /// The leave request.
        request_id: Uuid,
        /// The status the request currently holds.
        status: LeaveStatus,
    },

    /// A payroll record was already marked as paid.
    #[error("Payroll {key} is already paid")]
    AlreadyPaid {
        /// The payroll period key.
        key: PayrollKey,
    },

    /// A payroll record cannot be edited once paid.
    #[error("Payroll {key} is paid and can no longer be edited")]
    PayrollLocked {
        /// The payroll period key.
        key: PayrollKey,
    },

    /// No employee exists with the given id.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The employee id.
        id: Uuid,
    },

    /// The employee has been deactivated.
    #[error("Employee {id} is inactive")]
    InactiveEmployee {
        /// The employee id.
        id: Uuid,
    },

    /// No leave request exists with the given id.
    #[error("Leave request not found: {id}")]
    LeaveNotFound {
        /// The leave request id.
        id: Uuid,
    },

    /// No payroll record exists for the period.
    #[error("Payroll not found: {key}")]
    PayrollNotFound {
        /// The payroll period key.
        key: PayrollKey,
    },

    /// The caller is not allowed to perform the action.
    #[error("Not permitted: {action}")]
    Forbidden {
        /// The action that was refused.
        action: String,
    },

    /// A CSV export could not be written.
    #[error("Export failed: {message}")]
    Export {
        /// A description of the failure.
        message: String,
    },

    /// The record store failed.
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Broad category of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape or range.
    Validation,
    /// The entity's current state forbids the transition.
    Conflict,
    /// The referenced entity does not exist.
    NotFound,
    /// The caller lacks the required role.
    Forbidden,
    /// The external record store failed; retrying may succeed.
    Storage,
    /// The engine configuration is missing or invalid.
    Config,
    /// An unexpected internal failure.
    Internal,
}

impl EngineError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ErrorKind::Config
            }
            EngineError::Validation { .. }
            | EngineError::InvalidRange { .. }
            | EngineError::MissingReason => ErrorKind::Validation,
            EngineError::AlreadyCheckedIn { .. }
            | EngineError::AlreadyCheckedOut { .. }
            | EngineError::NoOpenCheckIn { .. }
            | EngineError::NotPending { .. }
            | EngineError::NotApproved { .. }
            | EngineError::AlreadyPaid { .. }
            | EngineError::PayrollLocked { .. }
            | EngineError::InactiveEmployee { .. } => ErrorKind::Conflict,
            EngineError::EmployeeNotFound { .. }
            | EngineError::LeaveNotFound { .. }
            | EngineError::PayrollNotFound { .. } => ErrorKind::NotFound,
            EngineError::Forbidden { .. } => ErrorKind::Forbidden,
            EngineError::Export { .. } => ErrorKind::Internal,
            EngineError::Storage(StoreError::Constraint { .. }) => ErrorKind::Conflict,
            EngineError::Storage(StoreError::Unavailable { .. }) => ErrorKind::Storage,
        }
    }

    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_invalid_range_displays_dates() {
        let error = EngineError::InvalidRange {
            from: NaiveDate::from_ymd_opt(2024, 2, 5).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid date range: from 2024-02-05 is after to 2024-02-03"
        );
    }

    #[test]
    fn test_not_pending_displays_status() {
        let id = Uuid::nil();
        let error = EngineError::NotPending {
            request_id: id,
            status: LeaveStatus::Approved,
        };
        assert_eq!(
            error.to_string(),
            format!("Leave request {} is approved, not pending", id)
        );
    }

    #[test]
    fn test_payroll_locked_displays_period() {
        let key = PayrollKey {
            employee_id: Uuid::nil(),
            month: 3,
            year: 2024,
        };
        let error = EngineError::PayrollLocked { key };
        assert!(error.to_string().contains("2024-03"));
        assert!(error.to_string().contains("can no longer be edited"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(EngineError::MissingReason.kind(), ErrorKind::Validation);
        assert_eq!(
            EngineError::NoOpenCheckIn {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            EngineError::LeaveNotFound { id: Uuid::nil() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EngineError::Storage(StoreError::Unavailable {
                message: "timeout".to_string()
            })
            .kind(),
            ErrorKind::Storage
        );
        assert_eq!(
            EngineError::Storage(StoreError::Constraint {
                message: "duplicate email".to_string()
            })
            .kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_store_error_converts_with_question_mark() {
        fn store_call() -> Result<(), StoreError> {
            Err(StoreError::Unavailable {
                message: "connection reset".to_string(),
            })
        }

        fn engine_call() -> EngineResult<()> {
            store_call()?;
            Ok(())
        }

        assert!(matches!(engine_call(), Err(EngineError::Storage(_))));
    }
}
