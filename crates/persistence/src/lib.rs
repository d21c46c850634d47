//! Persistence layer for the shipment report engine.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - The PostgreSQL `ReportStore` implementation
//! - Query metrics

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
