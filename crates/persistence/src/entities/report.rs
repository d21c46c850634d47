//! Row mappings for the report queries.
//!
//! Enumerations arrive as TEXT and are parsed on conversion; an unknown value
//! is reported as an error rather than skipped.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{
    CompletedShipment, CustomerOption, CustomerShipmentSummary, GroupCount, RouteCount, Shipment,
    TimelineEvent, UserActivityRow, UserOption,
};

/// `key, count` row of a group-by query.
#[derive(Debug, Clone, FromRow)]
pub struct GroupCountEntity {
    pub group_key: String,
    pub count: i64,
}

impl From<GroupCountEntity> for GroupCount {
    fn from(entity: GroupCountEntity) -> Self {
        GroupCount::new(entity.group_key, entity.count)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RouteCountEntity {
    pub origin: String,
    pub destination: String,
    pub count: i64,
}

impl From<RouteCountEntity> for RouteCount {
    fn from(entity: RouteCountEntity) -> Self {
        RouteCount {
            origin: entity.origin,
            destination: entity.destination,
            count: entity.count,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CompletedShipmentEntity {
    pub origin: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CompletedShipmentEntity> for CompletedShipment {
    fn from(entity: CompletedShipmentEntity) -> Self {
        CompletedShipment {
            origin: entity.origin,
            destination: entity.destination,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// One shipment of a ranked customer; rows of the same customer are adjacent.
///
/// Shipment columns are NULL for a customer without matching shipments.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerShipmentRowEntity {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub shipment_id: Option<Uuid>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub document_count: i64,
}

impl CustomerShipmentRowEntity {
    /// The shipment carried by this row, if any.
    pub fn shipment_summary(&self) -> Result<Option<CustomerShipmentSummary>, String> {
        let (Some(id), Some(status), Some(created_at), Some(updated_at)) = (
            self.shipment_id,
            self.status.as_deref(),
            self.created_at,
            self.updated_at,
        ) else {
            return Ok(None);
        };

        Ok(Some(CustomerShipmentSummary {
            id,
            status: status.parse()?,
            created_at,
            updated_at,
            document_count: self.document_count,
        }))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserActivityEntity {
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
    pub updated_at: DateTime<Utc>,
    pub shipment_count: i64,
    pub document_count: i64,
}

impl UserActivityEntity {
    pub fn into_domain(self) -> Result<UserActivityRow, String> {
        Ok(UserActivityRow {
            user_id: self.user_id,
            name: self.name,
            role: self.role.parse()?,
            updated_at: self.updated_at,
            shipment_count: self.shipment_count,
            document_count: self.document_count,
        })
    }
}

/// Shipment row joined with its customer's name.
#[derive(Debug, Clone, FromRow)]
pub struct ShipmentEntity {
    pub id: Uuid,
    pub reference: String,
    pub status: String,
    pub shipment_type: String,
    pub customer_id: Uuid,
    pub customer_name: String,
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

impl ShipmentEntity {
    /// Returns the shipment and its customer's name.
    pub fn into_domain(self) -> Result<(Shipment, String), String> {
        let shipment = Shipment {
            id: self.id,
            reference: self.reference,
            status: self.status.parse()?,
            shipment_type: self.shipment_type.parse()?,
            customer_id: self.customer_id,
            created_by: self.created_by,
            origin: self.origin,
            destination: self.destination,
            container_number: self.container_number,
            truck_number: self.truck_number,
            bill_of_lading: self.bill_of_lading,
            created_at: self.created_at,
            updated_at: self.updated_at,
            arrival_date: self.arrival_date,
        };

        Ok((shipment, self.customer_name))
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TimelineEventEntity {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl TimelineEventEntity {
    pub fn into_domain(self) -> Result<TimelineEvent, String> {
        Ok(TimelineEvent {
            id: self.id,
            shipment_id: self.shipment_id,
            status: self.status.parse()?,
            timestamp: self.timestamp,
            location: self.location,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomerOptionEntity {
    pub id: Uuid,
    pub name: String,
}

impl From<CustomerOptionEntity> for CustomerOption {
    fn from(entity: CustomerOptionEntity) -> Self {
        CustomerOption {
            id: entity.id,
            name: entity.name,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserOptionEntity {
    pub id: Uuid,
    pub name: String,
    pub role: String,
}

impl UserOptionEntity {
    pub fn into_domain(self) -> Result<UserOption, String> {
        Ok(UserOption {
            id: self.id,
            name: self.name,
            role: self.role.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{ShipmentStatus, ShipmentType, UserRole};

    fn shipment_entity(status: &str) -> ShipmentEntity {
        ShipmentEntity {
            id: Uuid::new_v4(),
            reference: "SHP-0001".to_string(),
            status: status.to_string(),
            shipment_type: "ROAD".to_string(),
            customer_id: Uuid::new_v4(),
            customer_name: "Acme Mining".to_string(),
            created_by: Uuid::new_v4(),
            origin: "Dar es Salaam".to_string(),
            destination: "Ndola".to_string(),
            container_number: None,
            truck_number: Some("T 123 ABC".to_string()),
            bill_of_lading: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            arrival_date: None,
        }
    }

    #[test]
    fn test_shipment_entity_into_domain() {
        let (shipment, customer_name) = shipment_entity("CUSTOMS_RELEASED").into_domain().unwrap();
        assert_eq!(shipment.status, ShipmentStatus::CustomsReleased);
        assert_eq!(shipment.shipment_type, ShipmentType::Road);
        assert_eq!(customer_name, "Acme Mining");
    }

    #[test]
    fn test_shipment_entity_unknown_status() {
        assert!(shipment_entity("LOST_AT_SEA").into_domain().is_err());
    }

    #[test]
    fn test_user_activity_entity_into_domain() {
        let entity = UserActivityEntity {
            user_id: Uuid::new_v4(),
            name: "Baraka".to_string(),
            role: "MANAGER".to_string(),
            updated_at: Utc::now(),
            shipment_count: 4,
            document_count: 9,
        };

        let row = entity.into_domain().unwrap();
        assert_eq!(row.role, UserRole::Manager);
        assert_eq!(row.document_count, 9);
    }

    #[test]
    fn test_group_count_entity_into_domain() {
        let group: GroupCount = GroupCountEntity {
            group_key: "VERIFIED".to_string(),
            count: 12,
        }
        .into();
        assert_eq!(group, GroupCount::new("VERIFIED", 12));
    }
}
