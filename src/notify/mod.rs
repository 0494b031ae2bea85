//! Leave decision notifications.
//!
//! A decided leave request produces a [`LeaveDecisionNotification`] that is
//! pushed onto a bounded queue and delivered by a detached worker. Delivery
//! never affects the decision itself: failures are logged and dropped.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hr_engine::notify::{LogNotifier, NotificationQueue, NotificationWorker};
//!
//! # async fn run() {
//! let (queue, rx) = NotificationQueue::new(64);
//! let worker = NotificationWorker::new(Arc::new(LogNotifier));
//! tokio::spawn(worker.run(rx));
//! # drop(queue);
//! # }
//! ```

mod queue;
mod webhook;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Employee, LeaveRequest, LeaveStatus, LeaveType};

pub use queue::{NotificationQueue, NotificationWorker};
pub use webhook::{LogNotifier, WebhookNotifier};

/// Failures reported while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP client could not be built.
    #[error("Failed to build webhook client: {message}")]
    Client {
        /// A description of the failure.
        message: String,
    },

    /// The request could not be sent or timed out.
    #[error("Webhook delivery to {url} failed: {message}")]
    Transport {
        /// The webhook URL.
        url: String,
        /// A description of the failure.
        message: String,
    },
}

/// The message sent after a leave request is approved or rejected.
///
/// `employee_id` carries the business employee code, not the internal id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDecisionNotification {
    /// Business employee code.
    pub employee_id: String,
    /// The employee's full name.
    pub name: String,
    /// The employee's email.
    pub email: String,
    /// The kind of leave.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub from_date: NaiveDate,
    /// Last day of leave.
    pub to_date: NaiveDate,
    /// `approved` or `rejected`.
    pub status: LeaveStatus,
    /// Comment left by the approver.
    pub admin_comment: Option<String>,
}

impl LeaveDecisionNotification {
    /// Builds the notification for a decided request.
    pub fn new(employee: &Employee, request: &LeaveRequest) -> Self {
        Self {
            employee_id: employee.employee_code.clone(),
            name: employee.full_name.clone(),
            email: employee.email.clone(),
            leave_type: request.leave_type,
            from_date: request.from_date,
            to_date: request.to_date,
            status: request.status,
            admin_comment: request.admin_comment.clone(),
        }
    }
}

/// Delivers decision notifications to an external receiver.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one notification.
    async fn notify(&self, notification: &LeaveDecisionNotification) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::models::Role;

    #[test]
    fn test_payload_uses_business_code_and_snake_case() {
        let employee = Employee {
            id: Uuid::new_v4(),
            full_name: "Ravi Nair".to_string(),
            email: "ravi@example.com".to_string(),
            employee_code: "EMP-007".to_string(),
            role: Role::Employee,
            department: None,
            designation: None,
            phone_number: None,
            base_salary: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
        };
        let request = LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            leave_type: LeaveType::Sick,
            from_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            reason: "Flu".to_string(),
            status: LeaveStatus::Approved,
            admin_comment: Some("Get well".to_string()),
            approver_id: Some(Uuid::new_v4()),
            decided_at: Some(Utc::now()),
            created_at: Utc::now(),
        };

        let json =
            serde_json::to_value(LeaveDecisionNotification::new(&employee, &request)).unwrap();

        assert_eq!(json["employee_id"], "EMP-007");
        assert_eq!(json["name"], "Ravi Nair");
        assert_eq!(json["leave_type"], "sick");
        assert_eq!(json["status"], "approved");
        assert_eq!(json["from_date"], "2024-01-10");
        assert_eq!(json["to_date"], "2024-01-12");
        assert_eq!(json["admin_comment"], "Get well");
    }
}
