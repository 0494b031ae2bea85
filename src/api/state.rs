//! Application state for the HR engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::ConfigLoader;
use crate::notify::NotificationQueue;
use crate::services::{
    AttendanceTracker, EmployeeDirectory, LeaveLifecycle, PayrollCalculator, ReportAggregator,
};
use crate::store::RecordStore;

/// Shared application state.
///
/// Holds one instance of every service, all wired to the same record store,
/// clock and notification queue.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    employees: Arc<EmployeeDirectory>,
    attendance: Arc<AttendanceTracker>,
    leave: Arc<LeaveLifecycle>,
    payroll: Arc<PayrollCalculator>,
    reports: Arc<ReportAggregator>,
}

impl AppState {
    /// Wires the services together.
    pub fn new(
        config: ConfigLoader,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        notifications: NotificationQueue,
    ) -> Self {
        let attendance = Arc::new(AttendanceTracker::new(
            store.clone(),
            clock.clone(),
            config.attendance().clone(),
            config.leave().cascade_policy,
        ));
        let leave = Arc::new(LeaveLifecycle::new(
            store.clone(),
            clock.clone(),
            attendance.clone(),
            notifications,
            config.leave().max_span_days,
        ));
        let employees = Arc::new(EmployeeDirectory::new(store.clone(), clock.clone()));
        let payroll = Arc::new(PayrollCalculator::new(store.clone(), clock.clone()));
        let reports = Arc::new(ReportAggregator::new(
            store,
            clock,
            config.attendance().offset(),
        ));

        Self {
            config: Arc::new(config),
            employees,
            attendance,
            leave,
            payroll,
            reports,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the employee directory.
    pub fn employees(&self) -> &EmployeeDirectory {
        &self.employees
    }

    /// Returns the attendance tracker.
    pub fn attendance(&self) -> &AttendanceTracker {
        &self.attendance
    }

    /// Returns the leave lifecycle.
    pub fn leave(&self) -> &LeaveLifecycle {
        &self.leave
    }

    /// Returns the payroll calculator.
    pub fn payroll(&self) -> &PayrollCalculator {
        &self.payroll
    }

    /// Returns the report aggregator.
    pub fn reports(&self) -> &ReportAggregator {
        &self.reports
    }
}
