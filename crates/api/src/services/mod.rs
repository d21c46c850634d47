//! Application services.

pub mod report_export;

pub use report_export::daily_rows_to_csv;
