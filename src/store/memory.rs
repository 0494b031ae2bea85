//! In-process record store.
//!
//! Holds every table behind a single [`RwLock`], which makes each method
//! atomic for its row the same way a conflict-aware upsert would be.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    AttendanceRecord, Employee, LeaveDecision, LeaveRequest, LeaveStatus, PayrollAmounts,
    PayrollKey, PayrollRecord, PayrollStatus,
};

use super::{
    AttendanceQuery, Conditional, PayrollQuery, RecordStore, StoreError, StoreResult,
};

#[derive(Debug, Default)]
struct Tables {
    employees: HashMap<Uuid, Employee>,
    attendance: BTreeMap<(Uuid, NaiveDate), AttendanceRecord>,
    leaves: HashMap<Uuid, LeaveRequest>,
    payroll: BTreeMap<PayrollKey, PayrollRecord>,
}

/// A [`RecordStore`] kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_employee(&self, employee: Employee) -> StoreResult<Employee> {
        let mut tables = self.tables.write().await;
        let email = employee.email.to_lowercase();
        if let Some(existing) = tables.employees.values().find(|e| {
            e.id == employee.id
                || e.email.to_lowercase() == email
                || e.employee_code == employee.employee_code
        }) {
            return Err(StoreError::Constraint {
                message: format!(
                    "employee {} conflicts with existing employee {}",
                    employee.employee_code, existing.employee_code
                ),
            });
        }
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn update_employee(&self, employee: Employee) -> StoreResult<Employee> {
        let mut tables = self.tables.write().await;
        match tables.employees.get_mut(&employee.id) {
            Some(row) => {
                *row = employee.clone();
                Ok(employee)
            }
            None => Err(StoreError::Constraint {
                message: format!("employee {} does not exist", employee.id),
            }),
        }
    }

    async fn get_employee(&self, id: Uuid) -> StoreResult<Option<Employee>> {
        Ok(self.tables.read().await.employees.get(&id).cloned())
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let mut employees: Vec<Employee> =
            self.tables.read().await.employees.values().cloned().collect();
        employees.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(employees)
    }

    async fn get_attendance(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self
            .tables
            .read()
            .await
            .attendance
            .get(&(employee_id, date))
            .cloned())
    }

    async fn upsert_attendance(&self, record: AttendanceRecord) -> StoreResult<AttendanceRecord> {
        let mut tables = self.tables.write().await;
        let key = (record.employee_id, record.date);
        let stored = match tables.attendance.get(&key) {
            Some(existing) => AttendanceRecord {
                id: existing.id,
                ..record
            },
            None => record,
        };
        tables.attendance.insert(key, stored.clone());
        Ok(stored)
    }

    async fn list_attendance(&self, query: &AttendanceQuery) -> StoreResult<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = self
            .tables
            .read()
            .await
            .attendance
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date).then(a.employee_id.cmp(&b.employee_id)));
        Ok(records)
    }

    async fn insert_leave(&self, request: LeaveRequest) -> StoreResult<LeaveRequest> {
        let mut tables = self.tables.write().await;
        if tables.leaves.contains_key(&request.id) {
            return Err(StoreError::Constraint {
                message: format!("leave request {} already exists", request.id),
            });
        }
        tables.leaves.insert(request.id, request.clone());
        Ok(request)
    }

    async fn get_leave(&self, id: Uuid) -> StoreResult<Option<LeaveRequest>> {
        Ok(self.tables.read().await.leaves.get(&id).cloned())
    }

    async fn decide_leave_if_pending(
        &self,
        id: Uuid,
        decision: &LeaveDecision,
    ) -> StoreResult<Conditional<LeaveRequest>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.leaves.get_mut(&id) else {
            return Ok(Conditional::Missing);
        };
        if row.status != LeaveStatus::Pending {
            return Ok(Conditional::Conflict(row.clone()));
        }
        *row = row.clone().decided(decision);
        Ok(Conditional::Applied(row.clone()))
    }

    async fn list_leaves(&self, employee_id: Option<Uuid>) -> StoreResult<Vec<LeaveRequest>> {
        let mut leaves: Vec<LeaveRequest> = self
            .tables
            .read()
            .await
            .leaves
            .values()
            .filter(|leave| employee_id.is_none_or(|id| id == leave.employee_id))
            .cloned()
            .collect();
        leaves.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(leaves)
    }

    async fn get_payroll(&self, key: PayrollKey) -> StoreResult<Option<PayrollRecord>> {
        Ok(self.tables.read().await.payroll.get(&key).cloned())
    }

    async fn upsert_payroll_unless_paid(
        &self,
        record: PayrollRecord,
    ) -> StoreResult<Conditional<PayrollRecord>> {
        let mut tables = self.tables.write().await;
        let key = record.key();
        match tables.payroll.get_mut(&key) {
            Some(existing) if existing.status == PayrollStatus::Paid => {
                Ok(Conditional::Conflict(existing.clone()))
            }
            Some(existing) => {
                let amounts = PayrollAmounts {
                    basic_salary: record.basic_salary,
                    deductions: record.deductions,
                    bonuses: record.bonuses,
                };
                *existing = existing.clone().with_amounts(amounts, record.updated_at);
                Ok(Conditional::Applied(existing.clone()))
            }
            None => {
                tables.payroll.insert(key, record.clone());
                Ok(Conditional::Applied(record))
            }
        }
    }

    async fn mark_payroll_paid_if_pending(
        &self,
        key: PayrollKey,
        paid_at: DateTime<Utc>,
    ) -> StoreResult<Conditional<PayrollRecord>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.payroll.get_mut(&key) else {
            return Ok(Conditional::Missing);
        };
        if row.status == PayrollStatus::Paid {
            return Ok(Conditional::Conflict(row.clone()));
        }
        row.status = PayrollStatus::Paid;
        row.paid_at = Some(paid_at);
        Ok(Conditional::Applied(row.clone()))
    }

    async fn list_payroll(&self, query: &PayrollQuery) -> StoreResult<Vec<PayrollRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<PayrollRecord> = tables
            .payroll
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            (a.year, a.month, a.employee_id).cmp(&(b.year, b.month, b.employee_id))
        });
        Ok(records)
    }
}
