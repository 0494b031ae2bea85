//! Attendance, leave and payroll consistency engine
//!
//! This crate keeps three HR records consistent with each other: daily
//! attendance derived from check-in and check-out times, leave requests that
//! overwrite attendance once approved, and monthly payroll whose net salary
//! is always derived from its components and which freezes once paid.
//!
//! The engine reads and writes through the [`store::RecordStore`] seam and
//! takes "now" from a [`clock::Clock`], so every rule can be exercised with
//! the in-memory store and a fixed clock.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod notify;
pub mod reports;
pub mod services;
pub mod store;
