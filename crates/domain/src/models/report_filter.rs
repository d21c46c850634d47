//! Report filter models.
//!
//! `ReportFilter` is the wire form a caller submits. The resolver turns it into a
//! `ResolvedFilter`, which deliberately splits into two independently applied parts:
//!
//! - [`ShipmentScopedFilter`]: status, type, customer, creator and creation window.
//!   Applied only to shipment-rooted queries.
//! - [`GlobalDateWindow`]: the bare date window. Applied to customers, documents,
//!   users, notifications and timeline events, which ignore the shipment filters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::shipment::{Shipment, ShipmentStatus, ShipmentType};

// ============================================================================
// Report Type
// ============================================================================

/// The kind of report requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    #[default]
    ShipmentsSummary,
    CustomerAnalytics,
    DocumentStatus,
    UserActivity,
    PerformanceMetrics,
    RouteAnalysis,
    MonthlyTrends,
    TimelineAnalysis,
    DailyShipmentReport,
}

impl ReportType {
    pub const ALL: [ReportType; 9] = [
        ReportType::ShipmentsSummary,
        ReportType::CustomerAnalytics,
        ReportType::DocumentStatus,
        ReportType::UserActivity,
        ReportType::PerformanceMetrics,
        ReportType::RouteAnalysis,
        ReportType::MonthlyTrends,
        ReportType::TimelineAnalysis,
        ReportType::DailyShipmentReport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::ShipmentsSummary => "SHIPMENTS_SUMMARY",
            ReportType::CustomerAnalytics => "CUSTOMER_ANALYTICS",
            ReportType::DocumentStatus => "DOCUMENT_STATUS",
            ReportType::UserActivity => "USER_ACTIVITY",
            ReportType::PerformanceMetrics => "PERFORMANCE_METRICS",
            ReportType::RouteAnalysis => "ROUTE_ANALYSIS",
            ReportType::MonthlyTrends => "MONTHLY_TRENDS",
            ReportType::TimelineAnalysis => "TIMELINE_ANALYSIS",
            ReportType::DailyShipmentReport => "DAILY_SHIPMENT_REPORT",
        }
    }

    /// Whether this is the per-shipment daily operations report.
    pub fn is_daily(&self) -> bool {
        matches!(self, ReportType::DailyShipmentReport)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Request DTO
// ============================================================================

/// Inclusive calendar date range supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Report request as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_report_filter"))]
pub struct ReportFilter {
    pub report_type: ReportType,

    #[serde(default)]
    pub date_range: Option<DateRange>,

    /// Day covered by the daily operations report (defaults to today).
    #[serde(default)]
    pub daily_report_date: Option<NaiveDate>,

    /// Restricts the daily operations report to one customer.
    #[serde(default)]
    pub daily_report_customer_id: Option<Uuid>,

    #[serde(default)]
    pub status: Option<Vec<ShipmentStatus>>,

    #[serde(default, rename = "type")]
    pub shipment_type: Option<Vec<ShipmentType>>,

    #[serde(default)]
    pub customer_id: Option<Uuid>,

    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl ReportFilter {
    /// Creates a filter of the given kind with no restrictions.
    pub fn new(report_type: ReportType) -> Self {
        Self {
            report_type,
            ..Default::default()
        }
    }

    /// Daily operations filter for `date`.
    pub fn daily(date: NaiveDate) -> Self {
        Self {
            report_type: ReportType::DailyShipmentReport,
            daily_report_date: Some(date),
            ..Default::default()
        }
    }

    pub fn with_date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_range = Some(DateRange { from, to });
        self
    }
}

/// Struct-level checks that need more than one field.
fn validate_report_filter(filter: &ReportFilter) -> Result<(), ValidationError> {
    if let Some(range) = filter.date_range {
        shared::validation::validate_date_order(range.from, range.to)?;
    }

    if filter.report_type.is_daily() {
        if let (Some(customer), Some(daily_customer)) =
            (filter.customer_id, filter.daily_report_customer_id)
        {
            if customer != daily_customer {
                let mut err = ValidationError::new("conflicting_customer");
                err.message = Some(
                    "customerId and dailyReportCustomerId name different customers".into(),
                );
                return Err(err);
            }
        }
    }

    Ok(())
}

// ============================================================================
// Resolved Filter
// ============================================================================

/// Half-open `[start, end)` time window; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at < end)
    }
}

/// Predicates applied to shipment-rooted queries only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentScopedFilter {
    /// `None` matches any status; `Some(empty)` matches nothing.
    pub statuses: Option<Vec<ShipmentStatus>>,
    /// `None` matches any type.
    pub types: Option<Vec<ShipmentType>>,
    pub customer_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created: DateWindow,
}

impl ShipmentScopedFilter {
    /// Narrows the status set to its intersection with `allowed`.
    pub fn restricted_to(&self, allowed: &[ShipmentStatus]) -> Self {
        let statuses = match &self.statuses {
            None => allowed.to_vec(),
            Some(current) => current
                .iter()
                .copied()
                .filter(|s| allowed.contains(s))
                .collect(),
        };

        Self {
            statuses: Some(statuses),
            ..self.clone()
        }
    }

    /// Replaces the creation window.
    pub fn created_within(&self, window: DateWindow) -> Self {
        Self {
            created: window,
            ..self.clone()
        }
    }

    pub fn matches(&self, shipment: &Shipment) -> bool {
        self.statuses
            .as_ref()
            .map_or(true, |set| set.contains(&shipment.status))
            && self
                .types
                .as_ref()
                .map_or(true, |set| set.contains(&shipment.shipment_type))
            && self.customer_id.map_or(true, |id| shipment.customer_id == id)
            && self.created_by.map_or(true, |id| shipment.created_by == id)
            && self.created.contains(shipment.created_at)
    }
}

/// Date window applied to every non-shipment entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalDateWindow(pub DateWindow);

impl GlobalDateWindow {
    pub fn window(&self) -> DateWindow {
        self.0
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.0.contains(at)
    }
}

/// What the report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    /// Aggregate report over the caller's date range.
    Standard,
    /// Per-shipment checkpoint rows for shipments created on `date`.
    DailyOperations { date: NaiveDate },
}

/// Canonical, validated form of a [`ReportFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilter {
    pub report_type: ReportType,
    pub scope: ReportScope,
    pub shipments: ShipmentScopedFilter,
    pub window: GlobalDateWindow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_report_filter_deserialize_camel_case() {
        let json = r#"{
            "reportType": "SHIPMENTS_SUMMARY",
            "dateRange": {"from": "2024-01-01", "to": "2024-01-31"},
            "status": ["DELIVERED", "IN_TRANSIT"],
            "type": ["SEA"]
        }"#;

        let filter: ReportFilter = serde_json::from_str(json).unwrap();
        assert_eq!(filter.report_type, ReportType::ShipmentsSummary);
        assert_eq!(filter.date_range.unwrap().to, date(2024, 1, 31));
        assert_eq!(filter.status.as_ref().unwrap().len(), 2);
        assert_eq!(filter.shipment_type, Some(vec![ShipmentType::Sea]));
        assert!(filter.customer_id.is_none());
    }

    #[test]
    fn test_report_filter_rejects_unknown_report_type() {
        let result = serde_json::from_str::<ReportFilter>(r#"{"reportType": "PROFIT"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_inverted_date_range() {
        let filter = ReportFilter::new(ReportType::ShipmentsSummary)
            .with_date_range(date(2024, 2, 1), date(2024, 1, 1));
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_validate_conflicting_daily_customer() {
        let mut filter = ReportFilter::daily(date(2024, 3, 5));
        filter.customer_id = Some(Uuid::new_v4());
        filter.daily_report_customer_id = Some(Uuid::new_v4());
        assert!(filter.validate().is_err());

        filter.daily_report_customer_id = filter.customer_id;
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn test_date_window_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let window = DateWindow::between(start, end);

        assert!(window.contains(start));
        assert!(!window.contains(end));
        assert!(DateWindow::unbounded().contains(end));
    }

    #[test]
    fn test_restricted_to_intersects_statuses() {
        let filter = ShipmentScopedFilter {
            statuses: Some(vec![ShipmentStatus::Delivered, ShipmentStatus::InTransit]),
            ..Default::default()
        };

        let completed = filter.restricted_to(&[ShipmentStatus::Delivered, ShipmentStatus::EmptyReturned]);
        assert_eq!(completed.statuses, Some(vec![ShipmentStatus::Delivered]));

        let none = filter.restricted_to(&[ShipmentStatus::Cancelled]);
        assert_eq!(none.statuses, Some(vec![]));
    }

    #[test]
    fn test_restricted_to_from_unrestricted() {
        let filter = ShipmentScopedFilter::default();
        let restricted = filter.restricted_to(&[ShipmentStatus::OnHold]);
        assert_eq!(restricted.statuses, Some(vec![ShipmentStatus::OnHold]));
    }
}
