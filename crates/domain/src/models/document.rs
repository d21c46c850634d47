//! Document domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of shipping document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    BillOfLading,
    CommercialInvoice,
    PackingList,
    CertificateOfOrigin,
    CustomsDeclaration,
    DeliveryOrder,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 7] = [
        DocumentType::BillOfLading,
        DocumentType::CommercialInvoice,
        DocumentType::PackingList,
        DocumentType::CertificateOfOrigin,
        DocumentType::CustomsDeclaration,
        DocumentType::DeliveryOrder,
        DocumentType::Other,
    ];

    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::BillOfLading => "BILL_OF_LADING",
            DocumentType::CommercialInvoice => "COMMERCIAL_INVOICE",
            DocumentType::PackingList => "PACKING_LIST",
            DocumentType::CertificateOfOrigin => "CERTIFICATE_OF_ORIGIN",
            DocumentType::CustomsDeclaration => "CUSTOMS_DECLARATION",
            DocumentType::DeliveryOrder => "DELIVERY_ORDER",
            DocumentType::Other => "OTHER",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid document type: {}", s))
    }
}

/// Verification state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Pending,
    Verified,
    Rejected,
}

impl DocumentStatus {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "PENDING",
            DocumentStatus::Verified => "VERIFIED",
            DocumentStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(DocumentStatus::Pending),
            "VERIFIED" => Ok(DocumentStatus::Verified),
            "REJECTED" => Ok(DocumentStatus::Rejected),
            _ => Err(format!(
                "Invalid document status: {}. Must be one of: PENDING, VERIFIED, REJECTED",
                s
            )),
        }
    }
}

/// A document attached to a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub shipment_id: Uuid,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}
