//! Read-only rollups over attendance, leave and payroll rows.
//!
//! Everything here is a pure function of the rows passed in; fetching and
//! authorization live in [`crate::services::ReportAggregator`].

mod summary;

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    AttendanceRecord, AttendanceStatus, LeaveRequest, LeaveStatus, LeaveType, PayrollRecord,
};

pub use summary::{
    DailyHours, DashboardSummary, EmployeeSummary, dashboard_summary, employee_summary,
};

/// Net salary paid out for one calendar month across employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPayrollTotal {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Sum of `net_salary`.
    pub total_net: Decimal,
    /// Number of payroll rows summed.
    pub records: usize,
}

/// Net salary for one employee across months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePayrollTotal {
    /// The employee.
    pub employee_id: Uuid,
    /// Sum of `net_salary`.
    pub total_net: Decimal,
    /// Number of months summed.
    pub months: usize,
}

/// Counts rows per attendance status. Every status is present in the map.
pub fn attendance_histogram(records: &[AttendanceRecord]) -> BTreeMap<AttendanceStatus, usize> {
    let mut histogram: BTreeMap<AttendanceStatus, usize> =
        AttendanceStatus::ALL.iter().map(|&s| (s, 0)).collect();
    for record in records {
        *histogram.entry(record.status).or_default() += 1;
    }
    histogram
}

/// Share of rows that are `present` or `half_day`, as a whole percent.
///
/// An empty slice yields zero.
///
/// # Example
///
/// ```
/// use hr_engine::reports::average_attendance;
/// use rust_decimal::Decimal;
///
/// assert_eq!(average_attendance(&[]), Decimal::ZERO);
/// ```
pub fn average_attendance(records: &[AttendanceRecord]) -> Decimal {
    let attended = records.iter().filter(|r| r.status.is_attended()).count();
    let divisor = records.len().max(1);
    (Decimal::from(attended) * Decimal::ONE_HUNDRED / Decimal::from(divisor))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Counts requests per leave type, regardless of status.
pub fn leave_type_histogram(requests: &[LeaveRequest]) -> BTreeMap<LeaveType, usize> {
    let mut histogram: BTreeMap<LeaveType, usize> =
        LeaveType::ALL.iter().map(|&t| (t, 0)).collect();
    for request in requests {
        *histogram.entry(request.leave_type).or_default() += 1;
    }
    histogram
}

/// Counts requests per status.
pub fn leave_status_histogram(requests: &[LeaveRequest]) -> BTreeMap<LeaveStatus, usize> {
    let mut histogram: BTreeMap<LeaveStatus, usize> =
        LeaveStatus::ALL.iter().map(|&s| (s, 0)).collect();
    for request in requests {
        *histogram.entry(request.status).or_default() += 1;
    }
    histogram
}

/// Sums net salary per (year, month), oldest first.
pub fn payroll_totals_by_month(records: &[PayrollRecord]) -> Vec<MonthlyPayrollTotal> {
    let mut totals: BTreeMap<(i32, u32), (Decimal, usize)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry((record.year, record.month)).or_default();
        entry.0 += record.net_salary;
        entry.1 += 1;
    }
    totals
        .into_iter()
        .map(|((year, month), (total_net, records))| MonthlyPayrollTotal {
            year,
            month,
            total_net,
            records,
        })
        .collect()
}

/// Sums net salary per employee.
pub fn payroll_totals_by_employee(records: &[PayrollRecord]) -> Vec<EmployeePayrollTotal> {
    let mut totals: BTreeMap<Uuid, (Decimal, usize)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.employee_id).or_default();
        entry.0 += record.net_salary;
        entry.1 += 1;
    }
    totals
        .into_iter()
        .map(|(employee_id, (total_net, months))| EmployeePayrollTotal {
            employee_id,
            total_net,
            months,
        })
        .collect()
}
