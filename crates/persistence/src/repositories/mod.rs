//! Repository implementations for database operations.

pub mod report;

pub use report::ReportRepository;
