//! Engine services.
//!
//! Each service owns one slice of the workflow and talks to the record
//! store through [`RecordStore`](crate::store::RecordStore). Every operation
//! takes the calling [`Actor`] explicitly.

mod attendance;
mod employees;
mod leave;
mod payroll;
mod reports;

use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::Actor;

pub use attendance::{AttendanceTracker, CalendarDay, CascadeWrite, effective_status};
pub use employees::{EmployeeDirectory, EmployeeUpdate, NewEmployee, ProfileUpdate};
pub use leave::{CascadeFailure, CascadeReport, DecisionResult, LeaveApplication, LeaveLifecycle};
pub use payroll::PayrollCalculator;
pub use reports::{AttendanceReport, LeaveReport, PayrollReport, ReportAggregator};

/// Narrows a listing filter to what the caller may see.
///
/// Administrators keep the requested filter. Employees get their own id
/// when none was requested and `Forbidden` when another id was.
pub(crate) fn scoped_employee(
    actor: &Actor,
    requested: Option<Uuid>,
    action: &str,
) -> EngineResult<Option<Uuid>> {
    if actor.is_admin() {
        return Ok(requested);
    }
    match requested {
        Some(id) => {
            actor.require_self(id, action)?;
            Ok(Some(id))
        }
        None => Ok(Some(actor.id)),
    }
}
