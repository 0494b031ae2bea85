//! Calculation logic for the HR consistency engine.
//!
//! This module contains the pure functions behind the stateful services:
//! working hours and half-day detection for closed attendance days, the
//! inclusive date sequence walked by the leave cascade, and net salary
//! derivation with its input checks.

mod date_range;
mod net_salary;
mod working_hours;

pub use date_range::{date_range, is_rest_day, month_dates, validate_range};
pub use net_salary::{calculate_net_salary, validate_amount, validate_month};
pub use working_hours::{
    DEFAULT_HALF_DAY_THRESHOLD, WorkingHoursResult, calculate_working_hours, round_hours,
};
