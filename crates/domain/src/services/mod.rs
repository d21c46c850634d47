//! Report services.
//!
//! The engine and its parts: filter resolution, the store abstraction, the
//! metric calculators and the daily timeline extractor.

pub mod calculators;
pub mod daily_timeline;
pub mod filter_resolver;
pub mod report_engine;
pub mod report_store;

pub use daily_timeline::{extract_daily_rows, Checkpoint};
pub use filter_resolver::resolve_filter;
pub use report_engine::{EngineSettings, ReportEngine, TREND_MONTHS};
pub use report_store::{InMemoryReportStore, ReportStore};
