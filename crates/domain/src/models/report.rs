//! Report result models.
//!
//! A `ReportResult` is fully computed before it leaves the engine. Renderers and
//! transports consume it as-is and must not re-derive any metric.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::report_filter::ReportType;
use super::shipment::{ShipmentStatus, ShipmentType};
use super::user::UserRole;

/// The consolidated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResult {
    pub report_type: ReportType,
    pub generated_at: DateTime<Utc>,
    pub period: ReportPeriod,
    pub summary: ReportSummary,
    pub shipments_by_status: Vec<DistributionEntry>,
    pub shipments_by_type: Vec<DistributionEntry>,
    pub documents_by_status: Vec<DistributionEntry>,
    pub documents_by_type: Vec<DistributionEntry>,
    pub users_by_role: Vec<DistributionEntry>,
    pub customer_analytics: Vec<CustomerAnalytics>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub top_routes: Vec<RouteAnalytics>,
    pub user_activity: Vec<UserActivity>,
    pub timeline_analytics: Vec<TimelineAnalytics>,
    pub performance_metrics: PerformanceMetrics,
    pub notifications_by_type: Vec<DistributionEntry>,
    /// Present only for the daily operations report, possibly empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_shipments: Option<Vec<DailyShipmentEntry>>,
}

/// Time span the report covers; unbounded sides are `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Headline counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_shipments: i64,
    pub active_shipments: i64,
    pub completed_shipments: i64,
    pub total_customers: i64,
    pub total_documents: i64,
    pub total_users: i64,
    /// Not yet available; always `null`.
    pub total_revenue: Option<f64>,
}

/// One bucket of a categorical breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub key: String,
    pub count: i64,
    pub percentage: i32,
}

/// Per-customer shipment statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAnalytics {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub total_shipments: i64,
    pub completed_shipments: i64,
    pub pending_shipments: i64,
    /// Mean days from creation to last update over completed shipments.
    pub average_delivery_time: i64,
    pub total_documents: i64,
}

/// Shipment and document activity for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub month: String,
    pub month_start: DateTime<Utc>,
    pub shipments: i64,
    pub documents: i64,
    pub completion_rate: i32,
}

/// A frequently completed origin/destination pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAnalytics {
    pub route: String,
    pub origin: String,
    pub destination: String,
    pub count: i64,
    pub average_delivery_time: i64,
    pub percentage: i32,
}

/// Per-user activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub user_id: Uuid,
    pub user_name: String,
    pub role: UserRole,
    pub shipments_created: i64,
    pub documents_uploaded: i64,
    /// The user record's own last update, not derived from activity.
    pub last_activity: DateTime<Utc>,
}

/// Transition counts per timeline status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineAnalytics {
    pub status: String,
    pub total_transitions: i64,
    /// Not yet available; always `null`.
    pub average_time_in_status: Option<f64>,
}

/// Operation-wide performance figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub average_delivery_time: i64,
    /// Share of shipments completed; not measured against the arrival date.
    pub on_time_delivery_rate: i32,
    pub document_approval_rate: i32,
    /// Not yet available; always `null`.
    pub customer_satisfaction_score: Option<f64>,
}

/// One denormalized row of the daily operations report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyShipmentEntry {
    pub shipment_id: Uuid,
    pub reference: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    #[serde(rename = "type")]
    pub shipment_type: ShipmentType,
    pub status: ShipmentStatus,
    pub origin: String,
    pub destination: String,
    pub container_number: Option<String>,
    pub truck_number: Option<String>,
    pub bill_of_lading: Option<String>,
    pub created_at: DateTime<Utc>,
    pub document_received_date: Option<DateTime<Utc>>,
    pub documents_sent_date: Option<DateTime<Utc>>,
    pub port_arrival_date: Option<DateTime<Utc>>,
    pub delivery_order_date: Option<DateTime<Utc>>,
    pub entry_registered_date: Option<DateTime<Utc>>,
    pub customs_released_date: Option<DateTime<Utc>>,
    pub truck_allocated_date: Option<DateTime<Utc>>,
    pub port_departure_date: Option<DateTime<Utc>>,
    pub tunduma_arrival_date: Option<DateTime<Utc>>,
    pub tunduma_departure_date: Option<DateTime<Utc>>,
    pub nakonde_arrival_date: Option<DateTime<Utc>>,
    pub nakonde_departure_date: Option<DateTime<Utc>>,
    pub destination_border_arrival_date: Option<DateTime<Utc>>,
    pub border_release_date: Option<DateTime<Utc>>,
    pub final_delivery_date: Option<DateTime<Utc>>,
}

// ============================================================================
// Filter Options
// ============================================================================

/// Values used to populate report filter pickers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub customers: Vec<CustomerOption>,
    pub users: Vec<UserOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOption {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOption {
    pub id: Uuid,
    pub name: String,
    pub role: UserRole,
}
