//! Attendance record model.
//!
//! One [`AttendanceRecord`] exists per employee per calendar date.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of an attendance day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Worked the day (4 hours or more, or still checked in).
    Present,
    /// Did not attend.
    Absent,
    /// Worked less than the half-day threshold.
    HalfDay,
    /// Covered by an approved leave request.
    Leave,
    /// Company holiday.
    Holiday,
}

impl AttendanceStatus {
    /// All statuses in display order.
    pub const ALL: [AttendanceStatus; 5] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::HalfDay,
        AttendanceStatus::Leave,
        AttendanceStatus::Holiday,
    ];

    /// Returns true if the status counts as attended.
    pub fn is_attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::HalfDay)
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
            AttendanceStatus::HalfDay => write!(f, "half_day"),
            AttendanceStatus::Leave => write!(f, "leave"),
            AttendanceStatus::Holiday => write!(f, "holiday"),
        }
    }
}

/// Where a stored record sits in the daily check-in/check-out state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    /// No check-in recorded (the record may still carry a leave or holiday status).
    NotCheckedIn,
    /// Checked in, not yet checked out.
    CheckedIn,
    /// Checked in and out; terminal for the day.
    Closed,
}

/// An attendance row, unique by `(employee_id, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Row identifier.
    pub id: Uuid,
    /// The employee this row belongs to.
    pub employee_id: Uuid,
    /// The calendar date.
    pub date: NaiveDate,
    /// Check-in time, if any.
    pub check_in: Option<DateTime<Utc>>,
    /// Check-out time, if any. Never earlier than `check_in`.
    pub check_out: Option<DateTime<Utc>>,
    /// The day's status.
    pub status: AttendanceStatus,
    /// Hours between check-in and check-out, rounded to two decimals.
    pub working_hours: Decimal,
}

impl AttendanceRecord {
    /// Returns the state-machine phase implied by the check-in/check-out fields.
    pub fn phase(&self) -> DayPhase {
        match (self.check_in, self.check_out) {
            (None, _) => DayPhase::NotCheckedIn,
            (Some(_), None) => DayPhase::CheckedIn,
            (Some(_), Some(_)) => DayPhase::Closed,
        }
    }

    /// Returns true if the record has a check-in without a check-out.
    pub fn is_open(&self) -> bool {
        self.phase() == DayPhase::CheckedIn
    }
}
