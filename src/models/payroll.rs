//! Payroll record model and related types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::calculate_net_salary;

/// Payment status of a payroll record. `Paid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    /// Not yet paid; amounts may still be edited.
    Pending,
    /// Paid; the record is locked.
    Paid,
}

impl std::fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayrollStatus::Pending => write!(f, "pending"),
            PayrollStatus::Paid => write!(f, "paid"),
        }
    }
}

/// The natural key of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayrollKey {
    /// The employee being paid.
    pub employee_id: Uuid,
    /// Month of the period (1-12).
    pub month: u32,
    /// Year of the period.
    pub year: i32,
}

impl std::fmt::Display for PayrollKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}-{:02}", self.employee_id, self.year, self.month)
    }
}

/// The editable salary components of a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollAmounts {
    /// Basic salary for the period.
    pub basic_salary: Decimal,
    /// Total deductions.
    pub deductions: Decimal,
    /// Total bonuses.
    pub bonuses: Decimal,
}

impl PayrollAmounts {
    /// Returns `basic_salary - deductions + bonuses`.
    pub fn net_salary(&self) -> Decimal {
        calculate_net_salary(self.basic_salary, self.deductions, self.bonuses)
    }
}

/// A payroll row, unique by `(employee_id, month, year)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Row identifier.
    pub id: Uuid,
    /// The employee being paid.
    pub employee_id: Uuid,
    /// Month of the period (1-12).
    pub month: u32,
    /// Year of the period.
    pub year: i32,
    /// Basic salary for the period.
    pub basic_salary: Decimal,
    /// Total deductions.
    pub deductions: Decimal,
    /// Total bonuses.
    pub bonuses: Decimal,
    /// Always `basic_salary - deductions + bonuses`; may be negative.
    pub net_salary: Decimal,
    /// Payment status.
    pub status: PayrollStatus,
    /// Set once, when the record transitions to paid.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    /// Last time the amounts were written.
    pub updated_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// Creates a pending record for the period with the given amounts.
    pub fn pending(key: PayrollKey, amounts: PayrollAmounts, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: key.employee_id,
            month: key.month,
            year: key.year,
            basic_salary: amounts.basic_salary,
            deductions: amounts.deductions,
            bonuses: amounts.bonuses,
            net_salary: amounts.net_salary(),
            status: PayrollStatus::Pending,
            paid_at: None,
            updated_at: now,
        }
    }

    /// Returns the natural key of this record.
    pub fn key(&self) -> PayrollKey {
        PayrollKey {
            employee_id: self.employee_id,
            month: self.month,
            year: self.year,
        }
    }

    /// Returns true if the record has been paid.
    pub fn is_paid(&self) -> bool {
        self.status == PayrollStatus::Paid
    }

    /// Overwrites the amounts, keeping the row identity.
    pub(crate) fn with_amounts(mut self, amounts: PayrollAmounts, now: DateTime<Utc>) -> Self {
        self.basic_salary = amounts.basic_salary;
        self.deductions = amounts.deductions;
        self.bonuses = amounts.bonuses;
        self.net_salary = amounts.net_salary();
        self.updated_at = now;
        self
    }
}

/// What the payroll screen shows for an employee and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayrollEntry {
    /// A stored record.
    Recorded(PayrollRecord),
    /// No record yet; the employee's base salary is offered as the default basic.
    Draft {
        /// The period key.
        key: PayrollKey,
        /// Default basic salary, not persisted until first edit.
        basic_salary: Decimal,
    },
}
