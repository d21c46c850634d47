//! Domain layer for the shipment report engine.
//!
//! This crate contains:
//! - Record models (Shipment, Document, Customer, User, TimelineEvent, Notification)
//! - Report filter and report result models
//! - The filter resolver, metric calculators and daily timeline extractor
//! - The `ReportStore` seam and the report engine that fans out over it
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::{ReportError, StoreError};
