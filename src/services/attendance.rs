//! Attendance state machine.
//!
//! A day moves through `NotCheckedIn -> CheckedIn -> Closed`; `Closed` is
//! terminal for that day. Approved leave writes `leave` rows through
//! [`AttendanceTracker::apply_leave`] without going through the check-in
//! transitions.

use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculation::{calculate_working_hours, is_rest_day, month_dates, validate_month};
use crate::clock::Clock;
use crate::config::{AttendanceSettings, CascadePolicy};
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, AttendanceRecord, AttendanceStatus, DayPhase};
use crate::store::{AttendanceQuery, RecordStore};

use super::scoped_employee;

/// One day of an employee's month view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// The calendar date.
    pub date: NaiveDate,
    /// The stored row, if any.
    pub record: Option<AttendanceRecord>,
    /// Stored status, or `absent` for a past working day with no row.
    pub status: Option<AttendanceStatus>,
}

/// Result of a single cascade write.
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeWrite {
    /// The date now holds a `leave` row.
    Written(AttendanceRecord),
    /// The date already held attendance and the policy kept it.
    Skipped,
}

/// Returns the status shown for a date.
///
/// A stored row always wins. Without one, rest days and dates from `today`
/// onwards have no status and earlier dates read as `absent`. The absent
/// status is never persisted.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use hr_engine::models::AttendanceStatus;
/// use hr_engine::services::effective_status;
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// let tuesday = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
/// let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
///
/// assert_eq!(
///     effective_status(None, tuesday, today, Weekday::Sun),
///     Some(AttendanceStatus::Absent)
/// );
/// assert_eq!(effective_status(None, sunday, today, Weekday::Sun), None);
/// assert_eq!(effective_status(None, today, today, Weekday::Sun), None);
/// ```
pub fn effective_status(
    record: Option<&AttendanceRecord>,
    date: NaiveDate,
    today: NaiveDate,
    rest_day: Weekday,
) -> Option<AttendanceStatus> {
    if let Some(record) = record {
        return Some(record.status);
    }
    if is_rest_day(date, rest_day) || date >= today {
        None
    } else {
        Some(AttendanceStatus::Absent)
    }
}

/// Records check-ins and check-outs and derives the day's status.
pub struct AttendanceTracker {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    settings: AttendanceSettings,
    cascade_policy: CascadePolicy,
}

impl AttendanceTracker {
    /// Creates a tracker using the configured threshold, rest day and offset.
    pub fn new(
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        settings: AttendanceSettings,
        cascade_policy: CascadePolicy,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
            cascade_policy,
        }
    }

    /// Returns today's date in the configured offset.
    pub fn today(&self) -> NaiveDate {
        self.clock.today(self.settings.offset())
    }

    /// Opens today's attendance for the caller.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when checking in for someone else
    /// - `EmployeeNotFound` / `InactiveEmployee`
    /// - `AlreadyCheckedIn` when today is already open
    /// - `AlreadyCheckedOut` when today is already closed
    pub async fn check_in(
        &self,
        actor: &Actor,
        employee_id: Uuid,
    ) -> EngineResult<AttendanceRecord> {
        actor.require_self(employee_id, "check in for another employee")?;

        let employee = self
            .store
            .get_employee(employee_id)
            .await?
            .ok_or(EngineError::EmployeeNotFound { id: employee_id })?;
        if !employee.is_active {
            return Err(EngineError::InactiveEmployee { id: employee_id });
        }

        let now = self.clock.now();
        let date = self.today();
        let existing = self.store.get_attendance(employee_id, date).await?;

        let id = match existing.as_ref().map(|r| (r.id, r.phase())) {
            Some((_, DayPhase::CheckedIn)) => return Err(EngineError::AlreadyCheckedIn { date }),
            Some((_, DayPhase::Closed)) => return Err(EngineError::AlreadyCheckedOut { date }),
            Some((id, DayPhase::NotCheckedIn)) => id,
            None => Uuid::new_v4(),
        };

        let record = self
            .store
            .upsert_attendance(AttendanceRecord {
                id,
                employee_id,
                date,
                check_in: Some(now),
                check_out: None,
                status: AttendanceStatus::Present,
                working_hours: Decimal::ZERO,
            })
            .await?;

        info!(
            employee_id = %employee_id,
            date = %date,
            check_in = %now,
            "Checked in"
        );
        Ok(record)
    }

    /// Closes today's attendance and derives working hours and status.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when checking out for someone else
    /// - `NoOpenCheckIn` when today has no open check-in
    /// - `Validation` when the clock reads earlier than the stored check-in
    pub async fn check_out(
        &self,
        actor: &Actor,
        employee_id: Uuid,
    ) -> EngineResult<AttendanceRecord> {
        actor.require_self(employee_id, "check out for another employee")?;

        let now = self.clock.now();
        let date = self.today();
        let record = self
            .store
            .get_attendance(employee_id, date)
            .await?
            .filter(AttendanceRecord::is_open)
            .ok_or(EngineError::NoOpenCheckIn { date })?;
        let check_in = record.check_in.ok_or(EngineError::NoOpenCheckIn { date })?;

        let result =
            calculate_working_hours(check_in, now, self.settings.half_day_threshold_hours)?;

        let record = self
            .store
            .upsert_attendance(AttendanceRecord {
                check_out: Some(now),
                status: result.status,
                working_hours: result.working_hours,
                ..record
            })
            .await?;

        info!(
            employee_id = %employee_id,
            date = %date,
            working_hours = %record.working_hours,
            status = %record.status,
            "Checked out"
        );
        Ok(record)
    }

    /// Writes a `leave` row for one date of an approved leave.
    ///
    /// Safe to repeat: the row converges to the same content. With
    /// [`CascadePolicy::SkipRecorded`] a date that already holds a non-absent
    /// row is left alone.
    pub(crate) async fn apply_leave(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<CascadeWrite> {
        let existing = self.store.get_attendance(employee_id, date).await?;

        if self.cascade_policy == CascadePolicy::SkipRecorded
            && existing.as_ref().is_some_and(|r| {
                r.status != AttendanceStatus::Absent && r.status != AttendanceStatus::Leave
            })
        {
            debug!(employee_id = %employee_id, date = %date, "Keeping recorded attendance");
            return Ok(CascadeWrite::Skipped);
        }

        let record = self
            .store
            .upsert_attendance(AttendanceRecord {
                id: existing.map_or_else(Uuid::new_v4, |r| r.id),
                employee_id,
                date,
                check_in: None,
                check_out: None,
                status: AttendanceStatus::Leave,
                working_hours: Decimal::ZERO,
            })
            .await?;
        Ok(CascadeWrite::Written(record))
    }

    /// Returns the status shown for an employee on a date.
    pub async fn status_on(
        &self,
        actor: &Actor,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<Option<AttendanceStatus>> {
        actor.require_self_or_admin(employee_id, "view another employee's attendance")?;

        let record = self.store.get_attendance(employee_id, date).await?;
        Ok(effective_status(
            record.as_ref(),
            date,
            self.today(),
            self.settings.rest_day,
        ))
    }

    /// Returns one entry per day of the month with its effective status.
    pub async fn month_calendar(
        &self,
        actor: &Actor,
        employee_id: Uuid,
        year: i32,
        month: u32,
    ) -> EngineResult<Vec<CalendarDay>> {
        actor.require_self_or_admin(employee_id, "view another employee's attendance")?;
        validate_month(month)?;
        let dates = month_dates(year, month)
            .ok_or_else(|| EngineError::validation("year", format!("{} is out of range", year)))?;

        let (Some(&first), Some(&last)) = (dates.first(), dates.last()) else {
            return Ok(Vec::new());
        };
        let records = self
            .store
            .list_attendance(&AttendanceQuery {
                employee_id: Some(employee_id),
                from: Some(first),
                to: Some(last),
            })
            .await?;

        let today = self.today();
        Ok(dates
            .into_iter()
            .map(|date| {
                let record = records.iter().find(|r| r.date == date).cloned();
                let status = effective_status(record.as_ref(), date, today, self.settings.rest_day);
                CalendarDay {
                    date,
                    record,
                    status,
                }
            })
            .collect())
    }

    /// Lists stored rows ordered by date.
    ///
    /// Employees only see their own rows; an unscoped query from an employee
    /// is narrowed to the caller.
    pub async fn list(
        &self,
        actor: &Actor,
        mut query: AttendanceQuery,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        query.employee_id = scoped_employee(
            actor,
            query.employee_id,
            "view another employee's attendance",
        )?;
        Ok(self.store.list_attendance(&query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{Employee, Role};
    use crate::store::MemoryStore;
    use chrono::{DateTime, Duration, NaiveDateTime, Utc};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_datetime(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<FixedClock>,
        tracker: AttendanceTracker,
        employee: Employee,
    }

    async fn fixture_with_policy(policy: CascadePolicy) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(make_datetime("2024-01-10 09:00:00")));
        let employee = Employee {
            id: Uuid::new_v4(),
            full_name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            employee_code: "EMP-001".to_string(),
            role: Role::Employee,
            department: None,
            designation: None,
            phone_number: None,
            base_salary: dec("50000"),
            is_active: true,
            created_at: make_datetime("2024-01-01 00:00:00"),
        };
        store.insert_employee(employee.clone()).await.unwrap();
        let tracker = AttendanceTracker::new(
            store.clone(),
            clock.clone(),
            AttendanceSettings::default(),
            policy,
        );
        Fixture {
            store,
            clock,
            tracker,
            employee,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with_policy(CascadePolicy::Overwrite).await
    }

    #[tokio::test]
    async fn test_check_in_opens_the_day() {
        let f = fixture().await;
        let actor = f.employee.as_actor();

        let record = f.tracker.check_in(&actor, f.employee.id).await.unwrap();

        assert_eq!(record.date, make_date("2024-01-10"));
        assert_eq!(record.check_in, Some(make_datetime("2024-01-10 09:00:00")));
        assert_eq!(record.check_out, None);
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.working_hours, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_second_check_in_is_rejected_and_row_unchanged() {
        let f = fixture().await;
        let actor = f.employee.as_actor();
        let first = f.tracker.check_in(&actor, f.employee.id).await.unwrap();

        f.clock.advance(Duration::minutes(30));
        let result = f.tracker.check_in(&actor, f.employee.id).await;

        assert!(matches!(result, Err(EngineError::AlreadyCheckedIn { .. })));
        let stored = f
            .store
            .get_attendance(f.employee.id, first.date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_check_in_after_close_is_rejected() {
        let f = fixture().await;
        let actor = f.employee.as_actor();
        f.tracker.check_in(&actor, f.employee.id).await.unwrap();
        f.clock.advance(Duration::hours(8));
        f.tracker.check_out(&actor, f.employee.id).await.unwrap();

        let result = f.tracker.check_in(&actor, f.employee.id).await;
        assert!(matches!(result, Err(EngineError::AlreadyCheckedOut { .. })));
    }

    #[tokio::test]
    async fn test_check_out_without_check_in_is_rejected() {
        let f = fixture().await;
        let result = f.tracker.check_out(&f.employee.as_actor(), f.employee.id).await;
        assert!(matches!(result, Err(EngineError::NoOpenCheckIn { .. })));
    }

    #[tokio::test]
    async fn test_check_out_twice_is_rejected() {
        let f = fixture().await;
        let actor = f.employee.as_actor();
        f.tracker.check_in(&actor, f.employee.id).await.unwrap();
        f.clock.advance(Duration::hours(5));
        f.tracker.check_out(&actor, f.employee.id).await.unwrap();

        let result = f.tracker.check_out(&actor, f.employee.id).await;
        assert!(matches!(result, Err(EngineError::NoOpenCheckIn { .. })));
    }

    #[tokio::test]
    async fn test_check_out_after_three_and_a_half_hours_is_half_day() {
        let f = fixture().await;
        let actor = f.employee.as_actor();
        f.tracker.check_in(&actor, f.employee.id).await.unwrap();
        f.clock.set(make_datetime("2024-01-10 12:30:00"));

        let record = f.tracker.check_out(&actor, f.employee.id).await.unwrap();

        assert_eq!(record.working_hours, dec("3.50"));
        assert_eq!(record.status, AttendanceStatus::HalfDay);
    }

    #[tokio::test]
    async fn test_check_out_at_exactly_four_hours_is_present() {
        let f = fixture().await;
        let actor = f.employee.as_actor();
        f.tracker.check_in(&actor, f.employee.id).await.unwrap();
        f.clock.set(make_datetime("2024-01-10 13:00:00"));

        let record = f.tracker.check_out(&actor, f.employee.id).await.unwrap();

        assert_eq!(record.working_hours, dec("4"));
        assert_eq!(record.status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_check_in_for_someone_else_is_forbidden() {
        let f = fixture().await;
        let admin = Actor {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let result = f.tracker.check_in(&admin, f.employee.id).await;
        assert!(matches!(result, Err(EngineError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_inactive_employee_cannot_check_in() {
        let f = fixture().await;
        let mut inactive = f.employee.clone();
        inactive.is_active = false;
        f.store.update_employee(inactive).await.unwrap();

        let result = f.tracker.check_in(&f.employee.as_actor(), f.employee.id).await;
        assert!(matches!(result, Err(EngineError::InactiveEmployee { .. })));
    }

    #[tokio::test]
    async fn test_check_in_on_a_leave_day_replaces_the_leave_row() {
        let f = fixture().await;
        let date = make_date("2024-01-10");
        let leave = f.tracker.apply_leave(f.employee.id, date).await.unwrap();
        let CascadeWrite::Written(leave) = leave else {
            panic!("expected a written row");
        };

        let record = f
            .tracker
            .check_in(&f.employee.as_actor(), f.employee.id)
            .await
            .unwrap();

        assert_eq!(record.id, leave.id);
        assert_eq!(record.status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_apply_leave_overwrites_and_is_idempotent() {
        let f = fixture().await;
        let actor = f.employee.as_actor();
        f.tracker.check_in(&actor, f.employee.id).await.unwrap();
        let date = make_date("2024-01-10");

        let first = f.tracker.apply_leave(f.employee.id, date).await.unwrap();
        let second = f.tracker.apply_leave(f.employee.id, date).await.unwrap();

        assert_eq!(first, second);
        let stored = f.store.get_attendance(f.employee.id, date).await.unwrap().unwrap();
        assert_eq!(stored.status, AttendanceStatus::Leave);
        assert_eq!(stored.check_in, None);
        assert_eq!(stored.working_hours, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_skip_recorded_policy_keeps_worked_days() {
        let f = fixture_with_policy(CascadePolicy::SkipRecorded).await;
        let actor = f.employee.as_actor();
        f.tracker.check_in(&actor, f.employee.id).await.unwrap();

        let worked = f
            .tracker
            .apply_leave(f.employee.id, make_date("2024-01-10"))
            .await
            .unwrap();
        let empty = f
            .tracker
            .apply_leave(f.employee.id, make_date("2024-01-11"))
            .await
            .unwrap();

        assert_eq!(worked, CascadeWrite::Skipped);
        assert!(matches!(
            empty,
            CascadeWrite::Written(ref r) if r.status == AttendanceStatus::Leave
        ));
    }

    #[tokio::test]
    async fn test_status_on_reports_virtual_absence() {
        let f = fixture().await;
        let actor = f.employee.as_actor();

        // 2024-01-09 is a Tuesday, 2024-01-07 a Sunday
        let past = f
            .tracker
            .status_on(&actor, f.employee.id, make_date("2024-01-09"))
            .await
            .unwrap();
        let sunday = f
            .tracker
            .status_on(&actor, f.employee.id, make_date("2024-01-07"))
            .await
            .unwrap();
        let future = f
            .tracker
            .status_on(&actor, f.employee.id, make_date("2024-01-11"))
            .await
            .unwrap();

        assert_eq!(past, Some(AttendanceStatus::Absent));
        assert_eq!(sunday, None);
        assert_eq!(future, None);
        // absence is derived, never written
        assert!(
            f.store
                .get_attendance(f.employee.id, make_date("2024-01-09"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_month_calendar_covers_every_day() {
        let f = fixture().await;
        let actor = f.employee.as_actor();
        f.tracker.check_in(&actor, f.employee.id).await.unwrap();

        let calendar = f
            .tracker
            .month_calendar(&actor, f.employee.id, 2024, 1)
            .await
            .unwrap();

        assert_eq!(calendar.len(), 31);
        assert_eq!(calendar[0].status, Some(AttendanceStatus::Absent)); // Mon 1st
        assert_eq!(calendar[6].status, None); // Sun 7th
        assert_eq!(calendar[9].status, Some(AttendanceStatus::Present)); // today
        assert!(calendar[9].record.is_some());
        assert_eq!(calendar[21].status, None); // future
    }

    #[tokio::test]
    async fn test_month_calendar_rejects_invalid_month() {
        let f = fixture().await;
        let result = f
            .tracker
            .month_calendar(&f.employee.as_actor(), f.employee.id, 2024, 13)
            .await;
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_the_caller_for_employees() {
        let f = fixture().await;
        let actor = f.employee.as_actor();
        f.tracker.check_in(&actor, f.employee.id).await.unwrap();
        f.store
            .upsert_attendance(AttendanceRecord {
                id: Uuid::new_v4(),
                employee_id: Uuid::new_v4(),
                date: make_date("2024-01-10"),
                check_in: None,
                check_out: None,
                status: AttendanceStatus::Leave,
                working_hours: Decimal::ZERO,
            })
            .await
            .unwrap();

        let own = f.tracker.list(&actor, AttendanceQuery::default()).await.unwrap();
        assert_eq!(own.len(), 1);

        let admin = Actor {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        let all = f.tracker.list(&admin, AttendanceQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let other = f
            .tracker
            .list(
                &actor,
                AttendanceQuery {
                    employee_id: Some(Uuid::new_v4()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(other, Err(EngineError::Forbidden { .. })));
    }
}
