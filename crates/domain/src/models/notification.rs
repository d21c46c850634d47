//! Notification record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Category of a notification emitted by the operational system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    ShipmentUpdate,
    DocumentUploaded,
    DocumentVerified,
    DocumentRejected,
    System,
}

impl NotificationType {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::ShipmentUpdate => "SHIPMENT_UPDATE",
            NotificationType::DocumentUploaded => "DOCUMENT_UPLOADED",
            NotificationType::DocumentVerified => "DOCUMENT_VERIFIED",
            NotificationType::DocumentRejected => "DOCUMENT_REJECTED",
            NotificationType::System => "SYSTEM",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification record; only its type and timestamp matter for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub timestamp: DateTime<Utc>,
}
