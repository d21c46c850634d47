//! Report engine error types.

use std::time::Duration;
use thiserror::Error;

/// Boxed cause carried by store failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of the data store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Query '{query}' failed: {source}")]
    Query {
        query: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("Report queries timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    /// Wraps an underlying error raised while running `query`.
    pub fn query(query: &'static str, source: impl Into<BoxError>) -> Self {
        StoreError::Query {
            query,
            source: source.into(),
        }
    }
}

/// Report generation errors.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Malformed or contradictory filter; raised before any query runs.
    #[error("Invalid report filter: {0}")]
    Validation(String),

    /// Any sub-query failed; the whole report is abandoned.
    #[error("Data store error: {0}")]
    Store(#[from] StoreError),

    /// A calculator received structurally invalid data.
    #[error("Computation error: {0}")]
    Computation(String),
}

impl From<validator::ValidationErrors> for ReportError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid ({})", field, e.code))
                })
            })
            .collect();
        messages.sort();

        ReportError::Validation(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_includes_query() {
        let err = StoreError::query("count_shipments", "connection reset");
        assert_eq!(
            err.to_string(),
            "Query 'count_shipments' failed: connection reset"
        );
    }

    #[test]
    fn test_store_error_keeps_source() {
        use std::error::Error as _;
        let err = StoreError::query("top_routes", "boom");
        assert_eq!(err.source().unwrap().to_string(), "boom");
    }

    #[test]
    fn test_report_error_from_store_error() {
        let err: ReportError = StoreError::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(err, ReportError::Store(StoreError::Timeout(_))));
        assert_eq!(
            err.to_string(),
            "Data store error: Report queries timed out after 5s"
        );
    }

    #[test]
    fn test_report_error_from_validation_errors() {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("date_range_order");
        err.message = Some("dateRange.to must not be before dateRange.from".into());
        errors.add("__all__", err);

        let report_error: ReportError = errors.into();
        match report_error {
            ReportError::Validation(msg) => assert!(msg.contains("must not be before")),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }
}
