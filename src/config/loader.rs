//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

use super::types::{AttendanceSettings, EngineConfig, LeaveSettings, NotificationSettings};

const ENGINE_FILE: &str = "engine.yaml";

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// └── engine.yaml   # attendance, leave, notification and server sections
/// ```
///
/// # Example
///
/// ```no_run
/// use hr_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Half day below {} hours", loader.attendance().half_day_threshold_hours);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `engine.yaml` is missing
    /// - the file contains invalid YAML
    /// - a value is out of range (non-positive threshold, offset beyond ±24h,
    ///   zero queue capacity, empty webhook URL)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let engine_path = path.as_ref().join(ENGINE_FILE);
        let config = Self::load_yaml::<EngineConfig>(&engine_path)?;
        Self::validate(&config).map_err(|message| EngineError::ConfigParseError {
            path: engine_path.display().to_string(),
            message,
        })?;
        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate(config: &EngineConfig) -> Result<(), String> {
        let attendance = &config.attendance;
        if attendance.half_day_threshold_hours <= Decimal::ZERO {
            return Err(format!(
                "attendance.half_day_threshold_hours must be positive (got {})",
                attendance.half_day_threshold_hours
            ));
        }
        if attendance.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(format!(
                "attendance.utc_offset_minutes must be within a day (got {})",
                attendance.utc_offset_minutes
            ));
        }
        if config.leave.max_span_days == 0 {
            return Err("leave.max_span_days must be at least 1".to_string());
        }
        if config.notification.queue_capacity == 0 {
            return Err("notification.queue_capacity must be at least 1".to_string());
        }
        if config
            .notification
            .webhook_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            return Err("notification.webhook_url must not be empty when set".to_string());
        }
        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the attendance settings.
    pub fn attendance(&self) -> &AttendanceSettings {
        &self.config.attendance
    }

    /// Returns the leave settings.
    pub fn leave(&self) -> &LeaveSettings {
        &self.config.leave
    }

    /// Returns the notification settings.
    pub fn notification(&self) -> &NotificationSettings {
        &self.config.notification
    }

    /// Returns the address the API should bind to.
    pub fn bind_address(&self) -> &str {
        &self.config.server.bind_address
    }
}
