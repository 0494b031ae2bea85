//! Inclusive calendar date ranges.
//!
//! The leave cascade walks every date of a request. Each step produces a new
//! date value from the previous one, so nothing is advanced in place.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{EngineError, EngineResult};

/// Checks that `from` is not after `to`.
///
/// # Example
///
/// ```
/// use hr_engine::calculation::validate_range;
/// use chrono::NaiveDate;
///
/// let from = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
/// let to = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
/// assert!(validate_range(from, to).is_err());
/// assert!(validate_range(to, from).is_ok());
/// ```
pub fn validate_range(from: NaiveDate, to: NaiveDate) -> EngineResult<()> {
    if from > to {
        Err(EngineError::InvalidRange { from, to })
    } else {
        Ok(())
    }
}

/// Returns every date in `[from, to]`, in ascending order.
///
/// Yields nothing when `from > to`.
///
/// # Example
///
/// ```
/// use hr_engine::calculation::date_range;
/// use chrono::NaiveDate;
///
/// let from = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
/// let to = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let dates: Vec<_> = date_range(from, to).collect();
///
/// assert_eq!(dates.len(), 3); // 2024 is a leap year
/// assert_eq!(dates[1], NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// ```
pub fn date_range(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> + Clone {
    std::iter::successors(Some(from), |day| day.succ_opt()).take_while(move |day| *day <= to)
}

/// Returns every date of the given month, or `None` for an invalid month.
pub fn month_dates(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    Some(date_range(first, last).collect())
}

/// Returns true if the date falls on the given weekly rest day.
pub fn is_rest_day(date: NaiveDate, rest_day: Weekday) -> bool {
    date.weekday() == rest_day
}
