//! Filter resolution.
//!
//! Turns a caller's [`ReportFilter`] into the canonical [`ResolvedFilter`] every
//! query in a report shares. Validation happens here, before any query is issued.

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::error::ReportError;
use crate::models::{
    DateWindow, GlobalDateWindow, ReportFilter, ReportScope, ResolvedFilter,
    ShipmentScopedFilter,
};
use shared::calendar::{day_window, start_of_day};

/// Resolves `filter` against the injected current time.
///
/// - Daily operations: the window is the whole UTC day of `dailyReportDate`
///   (today when absent) and `dailyReportCustomerId` becomes the shipment
///   filter's customer.
/// - Otherwise: the window is the caller's inclusive `dateRange`, or unbounded.
///
/// Empty status or type sets are treated as "no restriction".
pub fn resolve_filter(
    filter: &ReportFilter,
    now: DateTime<Utc>,
) -> Result<ResolvedFilter, ReportError> {
    filter.validate()?;

    let statuses = filter.status.clone().filter(|set| !set.is_empty());
    let types = filter.shipment_type.clone().filter(|set| !set.is_empty());

    let (scope, window, customer_id) = if filter.report_type.is_daily() {
        let date = filter.daily_report_date.unwrap_or_else(|| now.date_naive());
        let (start, end) = day_window(date);
        let customer_id = filter.daily_report_customer_id.or(filter.customer_id);

        (
            ReportScope::DailyOperations { date },
            DateWindow::between(start, end),
            customer_id,
        )
    } else {
        if filter.daily_report_date.is_some() || filter.daily_report_customer_id.is_some() {
            tracing::debug!(
                report_type = %filter.report_type,
                "Ignoring daily report fields on a non-daily report"
            );
        }

        let window = filter
            .date_range
            .map(|range| {
                let (_, end) = day_window(range.to);
                DateWindow::between(start_of_day(range.from), end)
            })
            .unwrap_or_default();

        (ReportScope::Standard, window, filter.customer_id)
    };

    Ok(ResolvedFilter {
        report_type: filter.report_type,
        scope,
        shipments: ShipmentScopedFilter {
            statuses,
            types,
            customer_id,
            created_by: filter.user_id,
            created: window,
        },
        window: GlobalDateWindow(window),
    })
}
