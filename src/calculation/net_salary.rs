//! Net salary derivation.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Calculates net salary as `basic - deductions + bonuses`.
///
/// The result is not clamped at zero: deductions larger than basic plus
/// bonuses produce a negative net salary.
///
/// # Example
///
/// ```
/// use hr_engine::calculation::calculate_net_salary;
/// use rust_decimal::Decimal;
///
/// let net = calculate_net_salary(
///     Decimal::new(50000, 0),
///     Decimal::new(2000, 0),
///     Decimal::new(1000, 0),
/// );
/// assert_eq!(net, Decimal::new(49000, 0));
/// ```
pub fn calculate_net_salary(basic: Decimal, deductions: Decimal, bonuses: Decimal) -> Decimal {
    basic - deductions + bonuses
}

/// Rejects negative currency amounts.
pub fn validate_amount(field: &str, amount: Decimal) -> EngineResult<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(EngineError::validation(
            field,
            format!("must not be negative (got {})", amount),
        ));
    }
    Ok(())
}

/// Rejects months outside 1-12.
pub fn validate_month(month: u32) -> EngineResult<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(EngineError::validation(
            "month",
            format!("must be between 1 and 12 (got {})", month),
        ))
    }
}
