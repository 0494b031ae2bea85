//! Payroll derivation and the one-way payment transition.
//!
//! A record is keyed by `(employee, month, year)`. While pending its amounts
//! can be overwritten any number of times; `mark_paid` locks it for good.

use std::sync::Arc;

use tracing::info;

use crate::calculation::{validate_amount, validate_month};
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, PayrollAmounts, PayrollEntry, PayrollKey, PayrollRecord};
use crate::store::{Conditional, PayrollQuery, RecordStore};

use super::scoped_employee;

/// Maintains payroll records.
pub struct PayrollCalculator {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl PayrollCalculator {
    /// Creates a calculator over `store`.
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Creates or updates the pending record for a period.
    ///
    /// `net_salary` is always `basic - deductions + bonuses` and may be
    /// negative. Updating keeps the existing record id.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the caller is an administrator
    /// - `Validation` for a month outside 1-12 or a negative amount
    /// - `EmployeeNotFound` if the employee does not exist
    /// - `PayrollLocked` if the record is already paid
    pub async fn upsert(
        &self,
        actor: &Actor,
        key: PayrollKey,
        amounts: PayrollAmounts,
    ) -> EngineResult<PayrollRecord> {
        actor.require_admin("edit payroll")?;
        validate_month(key.month)?;
        validate_amount("basic_salary", amounts.basic_salary)?;
        validate_amount("deductions", amounts.deductions)?;
        validate_amount("bonuses", amounts.bonuses)?;

        if self.store.get_employee(key.employee_id).await?.is_none() {
            return Err(EngineError::EmployeeNotFound {
                id: key.employee_id,
            });
        }

        let candidate = PayrollRecord::pending(key, amounts, self.clock.now());
        let record = match self.store.upsert_payroll_unless_paid(candidate).await? {
            Conditional::Applied(record) => record,
            Conditional::Conflict(_) => return Err(EngineError::PayrollLocked { key }),
            Conditional::Missing => return Err(EngineError::PayrollNotFound { key }),
        };

        info!(
            employee_id = %key.employee_id,
            year = key.year,
            month = key.month,
            net_salary = %record.net_salary,
            "Payroll saved"
        );
        Ok(record)
    }

    /// Moves a pending record to paid, stamping `paid_at` once.
    ///
    /// # Errors
    ///
    /// - `Forbidden` unless the caller is an administrator
    /// - `PayrollNotFound` if no record exists for the period
    /// - `AlreadyPaid` if the record was paid before; `paid_at` is unchanged
    pub async fn mark_paid(&self, actor: &Actor, key: PayrollKey) -> EngineResult<PayrollRecord> {
        actor.require_admin("mark payroll as paid")?;
        validate_month(key.month)?;

        let record = match self
            .store
            .mark_payroll_paid_if_pending(key, self.clock.now())
            .await?
        {
            Conditional::Applied(record) => record,
            Conditional::Conflict(_) => return Err(EngineError::AlreadyPaid { key }),
            Conditional::Missing => return Err(EngineError::PayrollNotFound { key }),
        };

        info!(
            employee_id = %key.employee_id,
            year = key.year,
            month = key.month,
            net_salary = %record.net_salary,
            "Payroll marked as paid"
        );
        Ok(record)
    }

    /// Returns the stored record, or a draft seeded with the employee's
    /// base salary. A draft is not persisted.
    pub async fn entry(&self, actor: &Actor, key: PayrollKey) -> EngineResult<PayrollEntry> {
        actor.require_self_or_admin(key.employee_id, "view another employee's payroll")?;
        validate_month(key.month)?;

        if let Some(record) = self.store.get_payroll(key).await? {
            return Ok(PayrollEntry::Recorded(record));
        }

        let employee = self
            .store
            .get_employee(key.employee_id)
            .await?
            .ok_or(EngineError::EmployeeNotFound {
                id: key.employee_id,
            })?;
        Ok(PayrollEntry::Draft {
            key,
            basic_salary: employee.base_salary,
        })
    }

    /// Lists records ordered by period. Employees only see their own.
    pub async fn list(
        &self,
        actor: &Actor,
        mut query: PayrollQuery,
    ) -> EngineResult<Vec<PayrollRecord>> {
        query.employee_id =
            scoped_employee(actor, query.employee_id, "view another employee's payroll")?;
        Ok(self.store.list_payroll(&query).await?)
    }
}
