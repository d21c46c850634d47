//! Raw query results consumed by the report calculators.
//!
//! These are projections, not records: each carries only the columns a
//! calculator reads.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::shipment::{Shipment, ShipmentStatus};
use super::timeline_event::TimelineEvent;
use super::user::UserRole;

/// One row of a group-by-count query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub key: String,
    pub count: i64,
}

impl GroupCount {
    pub fn new(key: impl Into<String>, count: i64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// A customer with its shipments that match the shipment filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerShipments {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub shipments: Vec<CustomerShipmentSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerShipmentSummary {
    pub id: Uuid,
    pub status: ShipmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub document_count: i64,
}

/// Completed shipment projection used for delivery-time statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedShipment {
    pub origin: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Completed shipments grouped by origin and destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCount {
    pub origin: String,
    pub destination: String,
    pub count: i64,
}

/// A user annotated with activity counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActivityRow {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub updated_at: DateTime<Utc>,
    /// Shipments created under the shipment filter.
    pub shipment_count: i64,
    /// Documents uploaded within the global date window.
    pub document_count: i64,
}

/// A shipment with its customer name and full timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentWithTimeline {
    pub shipment: Shipment,
    pub customer_name: String,
    pub events: Vec<TimelineEvent>,
}

/// Non-shipment record kinds counted under the global date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Filtered on `created_at`.
    Customers,
    /// Filtered on `uploaded_at`.
    Documents,
    /// Filtered on `created_at`.
    Users,
}

/// Groupable shipment columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentGroupField {
    Status,
    Type,
}

/// Groupable document columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentGroupField {
    Status,
    Type,
}
