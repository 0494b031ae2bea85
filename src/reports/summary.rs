//! Dashboard cards for administrators and employees.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AttendanceRecord, Employee, LeaveRequest, LeaveStatus, Role};

use super::leave_status_histogram;

/// Company-wide counters for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Active employees with the employee role.
    pub active_employees: usize,
    /// Rows for today that are `present` or `half_day`.
    pub present_today: usize,
    /// All leave requests ever filed.
    pub total_leaves: usize,
    /// Leave requests awaiting a decision.
    pub pending_leaves: usize,
}

/// Working hours for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyHours {
    /// The day.
    pub date: NaiveDate,
    /// Hours recorded for the day.
    pub working_hours: Decimal,
}

/// One employee's month at a glance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    /// The employee summarized.
    pub employee_id: Uuid,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Days in the month recorded as `present` or `half_day`.
    pub days_attended: usize,
    /// Requests whose first day falls in the month.
    pub leaves_this_month: usize,
    /// All of the employee's requests by status.
    pub leave_status_counts: BTreeMap<LeaveStatus, usize>,
    /// Working hours per recorded day, in date order.
    pub daily_hours: Vec<DailyHours>,
}

/// Builds the admin dashboard counters.
///
/// `today` must hold only the rows dated today.
pub fn dashboard_summary(
    employees: &[Employee],
    today: &[AttendanceRecord],
    leaves: &[LeaveRequest],
) -> DashboardSummary {
    DashboardSummary {
        active_employees: employees
            .iter()
            .filter(|e| e.is_active && e.role == Role::Employee)
            .count(),
        present_today: today.iter().filter(|r| r.status.is_attended()).count(),
        total_leaves: leaves.len(),
        pending_leaves: leaves
            .iter()
            .filter(|l| l.status == LeaveStatus::Pending)
            .count(),
    }
}

/// Builds the employee dashboard for a month.
///
/// `month_records` holds the employee's attendance within the month and
/// `leaves` every request the employee has filed.
pub fn employee_summary(
    employee_id: Uuid,
    year: i32,
    month: u32,
    month_records: &[AttendanceRecord],
    leaves: &[LeaveRequest],
) -> EmployeeSummary {
    let mut daily_hours: Vec<DailyHours> = month_records
        .iter()
        .map(|r| DailyHours {
            date: r.date,
            working_hours: r.working_hours,
        })
        .collect();
    daily_hours.sort_by_key(|d| d.date);

    EmployeeSummary {
        employee_id,
        year,
        month,
        days_attended: month_records
            .iter()
            .filter(|r| r.status.is_attended())
            .count(),
        leaves_this_month: leaves
            .iter()
            .filter(|l| l.from_date.year() == year && l.from_date.month() == month)
            .count(),
        leave_status_counts: leave_status_histogram(leaves),
        daily_hours,
    }
}
