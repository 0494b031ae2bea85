//! Core data models for the HR consistency engine.
//!
//! This module contains the persisted entities (employees, attendance,
//! leave requests, payroll) and the caller identity.

mod attendance;
mod employee;
mod leave;
mod payroll;

pub use attendance::{AttendanceRecord, AttendanceStatus, DayPhase};
pub use employee::{Actor, Employee, Role};
pub use leave::{LeaveDecision, LeaveOutcome, LeaveRequest, LeaveStatus, LeaveType};
pub use payroll::{PayrollAmounts, PayrollEntry, PayrollKey, PayrollRecord, PayrollStatus};
