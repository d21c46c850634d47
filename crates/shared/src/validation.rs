//! Common validation utilities.

use chrono::NaiveDate;
use validator::ValidationError;

/// Maximum number of rows a ranked listing may request.
pub const MAX_RANKING_LIMIT: usize = 100;

/// Validates that a date range is not inverted (`to` must not precede `from`).
pub fn validate_date_order(from: NaiveDate, to: NaiveDate) -> Result<(), ValidationError> {
    if to >= from {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_range_order");
        err.message = Some(
            format!("dateRange.to ({}) must not be before dateRange.from ({})", to, from).into(),
        );
        Err(err)
    }
}

/// Validates that a ranked listing limit is between 1 and [`MAX_RANKING_LIMIT`].
pub fn validate_ranking_limit(limit: usize) -> Result<(), ValidationError> {
    if (1..=MAX_RANKING_LIMIT).contains(&limit) {
        Ok(())
    } else {
        let mut err = ValidationError::new("ranking_limit_range");
        err.message = Some(format!("Limit must be between 1 and {}", MAX_RANKING_LIMIT).into());
        Err(err)
    }
}
