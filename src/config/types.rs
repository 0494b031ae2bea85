//! Configuration types for the HR consistency engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `engine.yaml`. Every field has a default so a
//! partial file is valid.

use chrono::{FixedOffset, Offset, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::DEFAULT_HALF_DAY_THRESHOLD;

/// How an approved leave treats dates that already hold attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadePolicy {
    /// Every date in the range becomes `leave`, replacing any recorded check-in.
    #[default]
    Overwrite,
    /// Dates with an existing non-absent record are left as they are.
    SkipRecorded,
}

/// Attendance rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceSettings {
    /// Days shorter than this many hours are recorded as half days.
    pub half_day_threshold_hours: Decimal,
    /// Weekly rest day, never reported as absent.
    pub rest_day: Weekday,
    /// Offset from UTC used to decide which calendar day "today" is.
    pub utc_offset_minutes: i32,
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            half_day_threshold_hours: DEFAULT_HALF_DAY_THRESHOLD,
            rest_day: Weekday::Sun,
            utc_offset_minutes: 0,
        }
    }
}

impl AttendanceSettings {
    /// Returns the configured offset, falling back to UTC when out of range.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Longest leave request accepted by default, in calendar days.
pub const DEFAULT_MAX_LEAVE_SPAN_DAYS: u32 = 366;

/// Leave rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaveSettings {
    /// Policy for dates that already hold attendance when a leave is approved.
    pub cascade_policy: CascadePolicy,
    /// Most calendar days a single request may cover, both ends included.
    pub max_span_days: u32,
}

impl Default for LeaveSettings {
    fn default() -> Self {
        Self {
            cascade_policy: CascadePolicy::default(),
            max_span_days: DEFAULT_MAX_LEAVE_SPAN_DAYS,
        }
    }
}

/// Outbound decision notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Webhook receiving leave decisions. Notifications are only logged when unset.
    pub webhook_url: Option<String>,
    /// Maximum number of undelivered notifications held in memory.
    pub queue_capacity: usize,
    /// Per-request timeout for webhook delivery.
    pub timeout_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            queue_capacity: 256,
            timeout_secs: 10,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the API binds to.
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Attendance rules.
    pub attendance: AttendanceSettings,
    /// Leave rules.
    pub leave: LeaveSettings,
    /// Notification delivery.
    pub notification: NotificationSettings,
    /// HTTP server.
    pub server: ServerSettings,
}
