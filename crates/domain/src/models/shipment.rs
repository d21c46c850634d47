//! Shipment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Shipment Status Enum
// ============================================================================

/// Operational lifecycle status of a shipment.
///
/// Timeline events use the same enum to record each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Created,
    DocumentReceived,
    DocumentsSent,
    ArrivedAtPort,
    DeliveryOrderObtained,
    EntryRegistered,
    CustomsReleased,
    TruckAllocated,
    DepartedPort,
    InTransit,
    ArrivedAtBorder,
    DepartedBorder,
    ArrivedAtDestinationBorder,
    BorderReleased,
    ArrivedAtDestination,
    Offloaded,
    Delivered,
    EmptyReturned,
    OnHold,
    Cancelled,
}

/// Statuses that count a shipment as completed.
pub const COMPLETED_STATUSES: [ShipmentStatus; 2] =
    [ShipmentStatus::Delivered, ShipmentStatus::EmptyReturned];

impl ShipmentStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [ShipmentStatus; 20] = [
        ShipmentStatus::Created,
        ShipmentStatus::DocumentReceived,
        ShipmentStatus::DocumentsSent,
        ShipmentStatus::ArrivedAtPort,
        ShipmentStatus::DeliveryOrderObtained,
        ShipmentStatus::EntryRegistered,
        ShipmentStatus::CustomsReleased,
        ShipmentStatus::TruckAllocated,
        ShipmentStatus::DepartedPort,
        ShipmentStatus::InTransit,
        ShipmentStatus::ArrivedAtBorder,
        ShipmentStatus::DepartedBorder,
        ShipmentStatus::ArrivedAtDestinationBorder,
        ShipmentStatus::BorderReleased,
        ShipmentStatus::ArrivedAtDestination,
        ShipmentStatus::Offloaded,
        ShipmentStatus::Delivered,
        ShipmentStatus::EmptyReturned,
        ShipmentStatus::OnHold,
        ShipmentStatus::Cancelled,
    ];

    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Created => "CREATED",
            ShipmentStatus::DocumentReceived => "DOCUMENT_RECEIVED",
            ShipmentStatus::DocumentsSent => "DOCUMENTS_SENT",
            ShipmentStatus::ArrivedAtPort => "ARRIVED_AT_PORT",
            ShipmentStatus::DeliveryOrderObtained => "DELIVERY_ORDER_OBTAINED",
            ShipmentStatus::EntryRegistered => "ENTRY_REGISTERED",
            ShipmentStatus::CustomsReleased => "CUSTOMS_RELEASED",
            ShipmentStatus::TruckAllocated => "TRUCK_ALLOCATED",
            ShipmentStatus::DepartedPort => "DEPARTED_PORT",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::ArrivedAtBorder => "ARRIVED_AT_BORDER",
            ShipmentStatus::DepartedBorder => "DEPARTED_BORDER",
            ShipmentStatus::ArrivedAtDestinationBorder => "ARRIVED_AT_DESTINATION_BORDER",
            ShipmentStatus::BorderReleased => "BORDER_RELEASED",
            ShipmentStatus::ArrivedAtDestination => "ARRIVED_AT_DESTINATION",
            ShipmentStatus::Offloaded => "OFFLOADED",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::EmptyReturned => "EMPTY_RETURNED",
            ShipmentStatus::OnHold => "ON_HOLD",
            ShipmentStatus::Cancelled => "CANCELLED",
        }
    }

    /// Delivered or empty container returned.
    pub fn is_completed(&self) -> bool {
        COMPLETED_STATUSES.contains(self)
    }

    /// Neither completed nor cancelled.
    pub fn is_active(&self) -> bool {
        !self.is_completed() && *self != ShipmentStatus::Cancelled
    }

    /// Statuses counted as active, in lifecycle order.
    pub fn active_statuses() -> Vec<ShipmentStatus> {
        Self::ALL.into_iter().filter(|s| s.is_active()).collect()
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid shipment status: {}", s))
    }
}

// ============================================================================
// Shipment Type Enum
// ============================================================================

/// Transport mode of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentType {
    Sea,
    Air,
    Road,
}

impl ShipmentType {
    pub const ALL: [ShipmentType; 3] = [ShipmentType::Sea, ShipmentType::Air, ShipmentType::Road];

    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentType::Sea => "SEA",
            ShipmentType::Air => "AIR",
            ShipmentType::Road => "ROAD",
        }
    }
}

impl fmt::Display for ShipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ShipmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SEA" => Ok(ShipmentType::Sea),
            "AIR" => Ok(ShipmentType::Air),
            "ROAD" => Ok(ShipmentType::Road),
            _ => Err(format!(
                "Invalid shipment type: {}. Must be one of: SEA, AIR, ROAD",
                s
            )),
        }
    }
}

// ============================================================================
// Core Model
// ============================================================================

/// A shipment record as owned by the operational store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: Uuid,
    pub reference: String,
    pub status: ShipmentStatus,
    #[serde(rename = "type")]
    pub shipment_type: ShipmentType,
    pub customer_id: Uuid,
    pub created_by: Uuid,
    pub origin: String,
    pub destination: String,
    pub container_number: Option<String>,
    pub truck_number: Option<String>,
    pub bill_of_lading: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub arrival_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in ShipmentStatus::ALL {
            assert_eq!(status.as_str().parse::<ShipmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_from_str_invalid() {
        let result = "LOST_AT_SEA".parse::<ShipmentStatus>();
        assert!(result.unwrap_err().contains("LOST_AT_SEA"));
    }

    #[test]
    fn test_status_serde_matches_storage_form() {
        let json = serde_json::to_string(&ShipmentStatus::ArrivedAtDestinationBorder).unwrap();
        assert_eq!(json, "\"ARRIVED_AT_DESTINATION_BORDER\"");
        let parsed: ShipmentStatus = serde_json::from_str("\"EMPTY_RETURNED\"").unwrap();
        assert_eq!(parsed, ShipmentStatus::EmptyReturned);
    }

    #[test]
    fn test_completed_and_active_partition() {
        assert!(ShipmentStatus::Delivered.is_completed());
        assert!(ShipmentStatus::EmptyReturned.is_completed());
        assert!(!ShipmentStatus::Offloaded.is_completed());

        assert!(ShipmentStatus::InTransit.is_active());
        assert!(!ShipmentStatus::Cancelled.is_active());
        assert!(!ShipmentStatus::Delivered.is_active());

        assert_eq!(ShipmentStatus::active_statuses().len(), 17);
    }

    #[test]
    fn test_shipment_type_from_str() {
        assert_eq!("SEA".parse::<ShipmentType>().unwrap(), ShipmentType::Sea);
        assert_eq!("ROAD".parse::<ShipmentType>().unwrap(), ShipmentType::Road);
        assert!("RAIL".parse::<ShipmentType>().is_err());
    }

    #[test]
    fn test_shipment_serializes_type_field() {
        let shipment = Shipment {
            id: Uuid::nil(),
            reference: "SHP-0001".to_string(),
            status: ShipmentStatus::Created,
            shipment_type: ShipmentType::Air,
            customer_id: Uuid::nil(),
            created_by: Uuid::nil(),
            origin: "Dubai".to_string(),
            destination: "Lusaka".to_string(),
            container_number: None,
            truck_number: None,
            bill_of_lading: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            arrival_date: None,
        };

        let json = serde_json::to_string(&shipment).unwrap();
        assert!(json.contains("\"type\":\"AIR\""));
        assert!(json.contains("\"customerId\""));
    }
}
