//! Report and export queries.
//!
//! Loads the rows a report needs, applies the caller's visibility and hands
//! them to the pure aggregators in [`crate::reports`] and [`crate::export`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::FixedOffset;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calculation::{month_dates, validate_month};
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::export;
use crate::models::{Actor, AttendanceStatus, LeaveStatus, LeaveType};
use crate::reports::{
    self, DashboardSummary, EmployeePayrollTotal, EmployeeSummary, MonthlyPayrollTotal,
};
use crate::store::{AttendanceQuery, PayrollQuery, RecordStore};

use super::scoped_employee;

/// Attendance rollup over a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceReport {
    /// Number of rows covered.
    pub records: usize,
    /// Rows per status.
    pub by_status: BTreeMap<AttendanceStatus, usize>,
    /// Whole percent of rows that are `present` or `half_day`.
    pub average_attendance: Decimal,
}

/// Leave rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveReport {
    /// Requests per leave type.
    pub by_type: BTreeMap<LeaveType, usize>,
    /// Requests per status.
    pub by_status: BTreeMap<LeaveStatus, usize>,
}

/// Payroll rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReport {
    /// Totals per calendar month.
    pub by_month: Vec<MonthlyPayrollTotal>,
    /// Totals per employee.
    pub by_employee: Vec<EmployeePayrollTotal>,
}

/// Serves dashboards, reports and CSV exports.
pub struct ReportAggregator {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl ReportAggregator {
    /// Creates an aggregator; `offset` decides "today" and export clock times.
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self {
            store,
            clock,
            offset,
        }
    }

    /// Status histogram and average attendance for the matching rows.
    pub async fn attendance(
        &self,
        actor: &Actor,
        mut query: AttendanceQuery,
    ) -> EngineResult<AttendanceReport> {
        query.employee_id =
            scoped_employee(actor, query.employee_id, "report on another employee")?;
        let records = self.store.list_attendance(&query).await?;
        debug!(records = records.len(), "Building attendance report");

        Ok(AttendanceReport {
            records: records.len(),
            by_status: reports::attendance_histogram(&records),
            average_attendance: reports::average_attendance(&records),
        })
    }

    /// Leave counts by type and status.
    pub async fn leave(
        &self,
        actor: &Actor,
        employee_id: Option<Uuid>,
    ) -> EngineResult<LeaveReport> {
        let employee_id = scoped_employee(actor, employee_id, "report on another employee")?;
        let requests = self.store.list_leaves(employee_id).await?;

        Ok(LeaveReport {
            by_type: reports::leave_type_histogram(&requests),
            by_status: reports::leave_status_histogram(&requests),
        })
    }

    /// Net salary totals by month and by employee.
    pub async fn payroll(
        &self,
        actor: &Actor,
        mut query: PayrollQuery,
    ) -> EngineResult<PayrollReport> {
        query.employee_id =
            scoped_employee(actor, query.employee_id, "report on another employee")?;
        let records = self.store.list_payroll(&query).await?;

        Ok(PayrollReport {
            by_month: reports::payroll_totals_by_month(&records),
            by_employee: reports::payroll_totals_by_employee(&records),
        })
    }

    /// Company-wide counters. Administrators only.
    pub async fn dashboard(&self, actor: &Actor) -> EngineResult<DashboardSummary> {
        actor.require_admin("view the company dashboard")?;

        let today = self.clock.today(self.offset);
        let employees = self.store.list_employees().await?;
        let attendance = self
            .store
            .list_attendance(&AttendanceQuery {
                employee_id: None,
                from: Some(today),
                to: Some(today),
            })
            .await?;
        let leaves = self.store.list_leaves(None).await?;

        Ok(reports::dashboard_summary(&employees, &attendance, &leaves))
    }

    /// One employee's month at a glance.
    pub async fn employee_summary(
        &self,
        actor: &Actor,
        employee_id: Uuid,
        year: i32,
        month: u32,
    ) -> EngineResult<EmployeeSummary> {
        actor.require_self_or_admin(employee_id, "view another employee's summary")?;
        validate_month(month)?;
        let dates = month_dates(year, month)
            .ok_or_else(|| EngineError::validation("year", format!("{} is out of range", year)))?;

        let records = self
            .store
            .list_attendance(&AttendanceQuery {
                employee_id: Some(employee_id),
                from: dates.first().copied(),
                to: dates.last().copied(),
            })
            .await?;
        let leaves = self.store.list_leaves(Some(employee_id)).await?;

        Ok(reports::employee_summary(
            employee_id,
            year,
            month,
            &records,
            &leaves,
        ))
    }

    /// Attendance rows as CSV.
    pub async fn attendance_csv(
        &self,
        actor: &Actor,
        mut query: AttendanceQuery,
    ) -> EngineResult<String> {
        query.employee_id =
            scoped_employee(actor, query.employee_id, "export another employee's attendance")?;
        let records = self.store.list_attendance(&query).await?;
        export::attendance_csv(&records, self.offset)
    }

    /// Leave requests as CSV, newest first.
    pub async fn leave_csv(
        &self,
        actor: &Actor,
        employee_id: Option<Uuid>,
    ) -> EngineResult<String> {
        let employee_id =
            scoped_employee(actor, employee_id, "export another employee's leave")?;
        let requests = self.store.list_leaves(employee_id).await?;
        export::leave_csv(&requests)
    }

    /// Payroll records as CSV.
    pub async fn payroll_csv(
        &self,
        actor: &Actor,
        mut query: PayrollQuery,
    ) -> EngineResult<String> {
        query.employee_id =
            scoped_employee(actor, query.employee_id, "export another employee's payroll")?;
        let records = self.store.list_payroll(&query).await?;
        export::payroll_csv(&records)
    }
}
