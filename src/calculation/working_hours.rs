//! Working hours and day status derivation.
//!
//! This module turns a check-in/check-out pair into the rounded number of
//! hours worked and decides whether the day counts as present or half day.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::AttendanceStatus;

/// Hours below which a closed day is recorded as a half day.
///
/// The comparison is strict: exactly 4.0 hours is a full day.
pub const DEFAULT_HALF_DAY_THRESHOLD: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// The result of closing an attendance day.
///
/// # Example
///
/// ```
/// use hr_engine::calculation::WorkingHoursResult;
/// use hr_engine::models::AttendanceStatus;
/// use rust_decimal::Decimal;
///
/// let result = WorkingHoursResult {
///     working_hours: Decimal::new(825, 2),
///     status: AttendanceStatus::Present,
/// };
/// assert_eq!(result.working_hours.to_string(), "8.25");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHoursResult {
    /// Hours worked, rounded to two decimal places.
    pub working_hours: Decimal,
    /// `HalfDay` if `working_hours` is below the threshold, otherwise `Present`.
    pub status: AttendanceStatus,
}

/// Rounds an hour value to two decimal places, midpoints away from zero.
pub fn round_hours(hours: Decimal) -> Decimal {
    hours.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes working hours and status for a check-in/check-out pair.
///
/// # Arguments
///
/// * `check_in` - When the employee checked in
/// * `check_out` - When the employee checked out
/// * `half_day_threshold` - Hours below which the day is a half day
///
/// # Returns
///
/// A [`WorkingHoursResult`], or a validation error if `check_out` is earlier
/// than `check_in`.
///
/// # Examples
///
/// ```
/// use hr_engine::calculation::{calculate_working_hours, DEFAULT_HALF_DAY_THRESHOLD};
/// use hr_engine::models::AttendanceStatus;
/// use chrono::{TimeZone, Utc};
/// use rust_decimal::Decimal;
///
/// let check_in = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
/// let check_out = Utc.with_ymd_and_hms(2024, 1, 10, 13, 0, 0).unwrap();
///
/// let result = calculate_working_hours(check_in, check_out, DEFAULT_HALF_DAY_THRESHOLD).unwrap();
/// assert_eq!(result.working_hours, Decimal::new(4, 0));
/// assert_eq!(result.status, AttendanceStatus::Present);
/// ```
pub fn calculate_working_hours(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    half_day_threshold: Decimal,
) -> EngineResult<WorkingHoursResult> {
    if check_out < check_in {
        return Err(EngineError::validation(
            "check_out",
            format!("check-out {} is earlier than check-in {}", check_out, check_in),
        ));
    }

    let elapsed_ms = (check_out - check_in).num_milliseconds();
    let working_hours = round_hours(Decimal::new(elapsed_ms, 0) / Decimal::new(MILLIS_PER_HOUR, 0));

    let status = if working_hours < half_day_threshold {
        AttendanceStatus::HalfDay
    } else {
        AttendanceStatus::Present
    };

    Ok(WorkingHoursResult {
        working_hours,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn nine_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    }

    fn close_after(duration: Duration) -> WorkingHoursResult {
        calculate_working_hours(nine_am(), nine_am() + duration, DEFAULT_HALF_DAY_THRESHOLD)
            .unwrap()
    }

    #[test]
    fn test_exactly_four_hours_is_present() {
        let result = close_after(Duration::hours(4));
        assert_eq!(result.working_hours, dec("4"));
        assert_eq!(result.status, AttendanceStatus::Present);
    }

    #[test]
    fn test_just_under_four_hours_is_half_day() {
        let result = close_after(Duration::hours(4) - Duration::minutes(1));
        assert_eq!(result.working_hours, dec("3.98"));
        assert_eq!(result.status, AttendanceStatus::HalfDay);
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        // 8h 20m = 8.3333... hours
        let result = close_after(Duration::hours(8) + Duration::minutes(20));
        assert_eq!(result.working_hours, dec("8.33"));
        assert_eq!(result.status, AttendanceStatus::Present);
    }

    #[test]
    fn test_midpoint_rounds_up() {
        // 18 seconds = 0.005 hours
        let result = close_after(Duration::seconds(18));
        assert_eq!(result.working_hours, dec("0.01"));
    }

    #[test]
    fn test_rounding_up_to_threshold_counts_as_present() {
        // 3h 59m 59s rounds to 4.00
        let result = close_after(Duration::hours(4) - Duration::seconds(1));
        assert_eq!(result.working_hours, dec("4.00"));
        assert_eq!(result.status, AttendanceStatus::Present);
    }

    #[test]
    fn test_zero_duration_is_half_day() {
        let result = close_after(Duration::zero());
        assert_eq!(result.working_hours, Decimal::ZERO);
        assert_eq!(result.status, AttendanceStatus::HalfDay);
    }

    #[test]
    fn test_check_out_before_check_in_is_rejected() {
        let result = calculate_working_hours(
            nine_am(),
            nine_am() - Duration::minutes(5),
            DEFAULT_HALF_DAY_THRESHOLD,
        );
        assert!(matches!(
            result,
            Err(EngineError::Validation { ref field, .. }) if field == "check_out"
        ));
    }

    #[test]
    fn test_custom_threshold() {
        let result =
            calculate_working_hours(nine_am(), nine_am() + Duration::hours(5), dec("6")).unwrap();
        assert_eq!(result.status, AttendanceStatus::HalfDay);
    }

    #[test]
    fn test_default_threshold_constant() {
        assert_eq!(DEFAULT_HALF_DAY_THRESHOLD, dec("4"));
    }

    proptest! {
        #[test]
        fn prop_hours_are_rounded_elapsed_time(elapsed_ms in 0i64..(72 * 3_600_000)) {
            let check_out = nine_am() + Duration::milliseconds(elapsed_ms);
            let result =
                calculate_working_hours(nine_am(), check_out, DEFAULT_HALF_DAY_THRESHOLD).unwrap();

            let elapsed = Decimal::new(elapsed_ms, 0) / Decimal::new(MILLIS_PER_HOUR, 0);
            let expected = round_hours(elapsed);
            prop_assert_eq!(result.working_hours, expected);
            prop_assert!(result.working_hours.scale() <= 2);
            prop_assert!(result.working_hours >= Decimal::ZERO);
        }

        #[test]
        fn prop_half_day_iff_below_threshold(elapsed_ms in 0i64..(12 * 3_600_000)) {
            let check_out = nine_am() + Duration::milliseconds(elapsed_ms);
            let result =
                calculate_working_hours(nine_am(), check_out, DEFAULT_HALF_DAY_THRESHOLD).unwrap();

            let is_half_day = result.status == AttendanceStatus::HalfDay;
            prop_assert_eq!(is_half_day, result.working_hours < DEFAULT_HALF_DAY_THRESHOLD);
        }
    }
}
