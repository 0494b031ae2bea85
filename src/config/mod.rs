//! Configuration loading and management for the HR consistency engine.
//!
//! This module loads the engine settings (attendance rules, leave cascade
//! policy, notification delivery and server address) from YAML.
//!
//! # Example
//!
//! ```no_run
//! use hr_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Rest day: {}", config.attendance().rest_day);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AttendanceSettings, CascadePolicy, EngineConfig, LeaveSettings, NotificationSettings,
    ServerSettings,
};
