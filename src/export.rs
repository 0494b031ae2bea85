//! CSV exports for attendance, leave and payroll reports.
//!
//! Each export starts with a header row. Attendance times are rendered as
//! `HH:MM` in the configured offset, or `-` when missing.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, LeaveRequest, PayrollRecord};

/// Header of the attendance export.
pub const ATTENDANCE_HEADER: [&str; 5] =
    ["Date", "Check In", "Check Out", "Status", "Working Hours"];

/// Header of the leave export.
pub const LEAVE_HEADER: [&str; 5] = ["Type", "From", "To", "Reason", "Status"];

/// Header of the payroll export.
pub const PAYROLL_HEADER: [&str; 7] = [
    "Month",
    "Year",
    "Basic",
    "Deductions",
    "Bonuses",
    "Net Salary",
    "Status",
];

fn clock_time(instant: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    instant
        .map(|t| t.with_timezone(&offset).format("%H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn write_rows<H, R, I>(header: H, rows: I) -> EngineResult<String>
where
    H: Serialize,
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(header).map_err(export_error)?;
    for row in rows {
        writer.serialize(row).map_err(export_error)?;
    }
    let bytes = writer.into_inner().map_err(|e| EngineError::Export {
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| EngineError::Export {
        message: e.to_string(),
    })
}

fn export_error(e: csv::Error) -> EngineError {
    EngineError::Export {
        message: e.to_string(),
    }
}

/// Renders attendance rows as CSV.
///
/// # Example
///
/// ```
/// use chrono::FixedOffset;
/// use hr_engine::export::attendance_csv;
///
/// let csv = attendance_csv(&[], FixedOffset::east_opt(0).unwrap()).unwrap();
/// assert_eq!(csv, "Date,Check In,Check Out,Status,Working Hours\n");
/// ```
pub fn attendance_csv(records: &[AttendanceRecord], offset: FixedOffset) -> EngineResult<String> {
    write_rows(
        ATTENDANCE_HEADER,
        records.iter().map(|r| {
            (
                r.date.to_string(),
                clock_time(r.check_in, offset),
                clock_time(r.check_out, offset),
                r.status.to_string(),
                r.working_hours.normalize().to_string(),
            )
        }),
    )
}

/// Renders leave requests as CSV.
pub fn leave_csv(requests: &[LeaveRequest]) -> EngineResult<String> {
    write_rows(
        LEAVE_HEADER,
        requests.iter().map(|l| {
            (
                l.leave_type.to_string(),
                l.from_date.to_string(),
                l.to_date.to_string(),
                l.reason.as_str(),
                l.status.to_string(),
            )
        }),
    )
}

/// Renders payroll records as CSV.
pub fn payroll_csv(records: &[PayrollRecord]) -> EngineResult<String> {
    write_rows(
        PAYROLL_HEADER,
        records.iter().map(|p| {
            (
                p.month,
                p.year,
                p.basic_salary.to_string(),
                p.deductions.to_string(),
                p.bonuses.to_string(),
                p.net_salary.to_string(),
                p.status.to_string(),
            )
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttendanceStatus, LeaveStatus, LeaveType, PayrollAmounts, PayrollKey, PayrollStatus,
    };
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_attendance_csv_formats_times_and_hours() {
        let records = vec![
            AttendanceRecord {
                id: Uuid::new_v4(),
                employee_id: Uuid::nil(),
                date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                check_in: Some(make_datetime("2024-01-10 09:05:00")),
                check_out: Some(make_datetime("2024-01-10 12:35:00")),
                status: AttendanceStatus::HalfDay,
                working_hours: dec("3.50"),
            },
            AttendanceRecord {
                id: Uuid::new_v4(),
                employee_id: Uuid::nil(),
                date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
                check_in: None,
                check_out: None,
                status: AttendanceStatus::Leave,
                working_hours: Decimal::ZERO,
            },
        ];

        let csv = attendance_csv(&records, utc()).unwrap();

        assert_eq!(
            csv,
            "Date,Check In,Check Out,Status,Working Hours\n\
             2024-01-10,09:05,12:35,half_day,3.5\n\
             2024-01-11,-,-,leave,0\n"
        );
    }

    #[test]
    fn test_attendance_csv_uses_offset() {
        let records = vec![AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            check_in: Some(make_datetime("2024-01-10 03:30:00")),
            check_out: None,
            status: AttendanceStatus::Present,
            working_hours: Decimal::ZERO,
        }];
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();

        let csv = attendance_csv(&records, ist).unwrap();
        assert!(csv.contains("2024-01-10,09:00,-,present,0"));
    }

    #[test]
    fn test_leave_csv_quotes_reasons_with_commas() {
        let requests = vec![LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::nil(),
            leave_type: LeaveType::Sick,
            from_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            reason: "Fever, cough".to_string(),
            status: LeaveStatus::Approved,
            admin_comment: None,
            approver_id: None,
            decided_at: None,
            created_at: Utc::now(),
        }];

        let csv = leave_csv(&requests).unwrap();

        assert_eq!(
            csv,
            "Type,From,To,Reason,Status\n\
             sick,2024-01-10,2024-01-12,\"Fever, cough\",approved\n"
        );
    }

    #[test]
    fn test_payroll_csv() {
        let mut record = PayrollRecord::pending(
            PayrollKey {
                employee_id: Uuid::nil(),
                month: 1,
                year: 2024,
            },
            PayrollAmounts {
                basic_salary: dec("50000"),
                deductions: dec("2000"),
                bonuses: dec("1000"),
            },
            Utc::now(),
        );
        record.status = PayrollStatus::Paid;

        let csv = payroll_csv(&[record]).unwrap();

        assert_eq!(
            csv,
            "Month,Year,Basic,Deductions,Bonuses,Net Salary,Status\n\
             1,2024,50000,2000,1000,49000,paid\n"
        );
    }
}
