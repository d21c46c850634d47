//! Shared utilities and common types for the report engine.
//!
//! This crate provides common functionality used across all other crates:
//! - Calendar helpers (day and month windows in UTC)
//! - Percentage and averaging helpers with the zero-division policy
//! - Common validation logic

pub mod calendar;
pub mod ratio;
pub mod validation;
