//! Shipment timeline event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shipment::ShipmentStatus;

/// A timestamped transition of a shipment into a status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub status: ShipmentStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TimelineEvent {
    /// Case-insensitive substring match on the event location.
    ///
    /// Events without a location never match.
    pub fn location_matches(&self, needle: &str) -> bool {
        self.location
            .as_deref()
            .map(|location| location.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false)
    }
}
