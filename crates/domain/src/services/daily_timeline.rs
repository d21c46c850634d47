//! Daily operations extraction.
//!
//! Flattens each shipment's timeline into one row with a column per checkpoint.

use chrono::{DateTime, Utc};

use crate::models::{DailyShipmentEntry, ShipmentStatus, ShipmentWithTimeline, TimelineEvent};

/// A fixed milestone: the first event in `status`, optionally at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub status: ShipmentStatus,
    pub location: Option<&'static str>,
}

impl Checkpoint {
    const fn at(status: ShipmentStatus) -> Self {
        Self {
            status,
            location: None,
        }
    }

    const fn at_location(status: ShipmentStatus, location: &'static str) -> Self {
        Self {
            status,
            location: Some(location),
        }
    }

    fn matches(&self, event: &TimelineEvent) -> bool {
        event.status == self.status
            && self
                .location
                .map_or(true, |location| event.location_matches(location))
    }

    /// Timestamp of the first matching event in `events` (which must be sorted).
    pub fn first_in(&self, events: &[TimelineEvent]) -> Option<DateTime<Utc>> {
        events.iter().find(|e| self.matches(e)).map(|e| e.timestamp)
    }
}

pub const DOCUMENT_RECEIVED: Checkpoint = Checkpoint::at(ShipmentStatus::DocumentReceived);
pub const DOCUMENTS_SENT: Checkpoint = Checkpoint::at(ShipmentStatus::DocumentsSent);
pub const PORT_ARRIVAL: Checkpoint = Checkpoint::at(ShipmentStatus::ArrivedAtPort);
pub const DELIVERY_ORDER: Checkpoint = Checkpoint::at(ShipmentStatus::DeliveryOrderObtained);
pub const ENTRY_REGISTERED: Checkpoint = Checkpoint::at(ShipmentStatus::EntryRegistered);
pub const CUSTOMS_RELEASED: Checkpoint = Checkpoint::at(ShipmentStatus::CustomsReleased);
pub const TRUCK_ALLOCATED: Checkpoint = Checkpoint::at(ShipmentStatus::TruckAllocated);
pub const PORT_DEPARTURE: Checkpoint = Checkpoint::at(ShipmentStatus::DepartedPort);
pub const TUNDUMA_ARRIVAL: Checkpoint =
    Checkpoint::at_location(ShipmentStatus::ArrivedAtBorder, "Tunduma");
pub const TUNDUMA_DEPARTURE: Checkpoint =
    Checkpoint::at_location(ShipmentStatus::DepartedBorder, "Tunduma");
pub const NAKONDE_ARRIVAL: Checkpoint =
    Checkpoint::at_location(ShipmentStatus::ArrivedAtBorder, "Nakonde");
pub const NAKONDE_DEPARTURE: Checkpoint =
    Checkpoint::at_location(ShipmentStatus::DepartedBorder, "Nakonde");
pub const DESTINATION_BORDER_ARRIVAL: Checkpoint =
    Checkpoint::at(ShipmentStatus::ArrivedAtDestinationBorder);
pub const BORDER_RELEASE: Checkpoint = Checkpoint::at(ShipmentStatus::BorderReleased);

const DELIVERED: Checkpoint = Checkpoint::at(ShipmentStatus::Delivered);
const EMPTY_RETURNED: Checkpoint = Checkpoint::at(ShipmentStatus::EmptyReturned);

/// Builds one row per shipment, ordered by creation time then reference.
pub fn extract_daily_rows(shipments: Vec<ShipmentWithTimeline>) -> Vec<DailyShipmentEntry> {
    let mut rows: Vec<DailyShipmentEntry> = shipments.into_iter().map(daily_row).collect();
    rows.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.reference.cmp(&b.reference))
    });
    rows
}

fn daily_row(item: ShipmentWithTimeline) -> DailyShipmentEntry {
    let ShipmentWithTimeline {
        shipment,
        customer_name,
        mut events,
    } = item;

    // Stable, so same-timestamp events keep the store's order.
    events.sort_by_key(|e| e.timestamp);
    let first = |checkpoint: Checkpoint| checkpoint.first_in(&events);

    DailyShipmentEntry {
        shipment_id: shipment.id,
        reference: shipment.reference,
        customer_id: shipment.customer_id,
        customer_name,
        shipment_type: shipment.shipment_type,
        status: shipment.status,
        origin: shipment.origin,
        destination: shipment.destination,
        container_number: shipment.container_number,
        truck_number: shipment.truck_number,
        bill_of_lading: shipment.bill_of_lading,
        created_at: shipment.created_at,
        document_received_date: first(DOCUMENT_RECEIVED),
        documents_sent_date: first(DOCUMENTS_SENT),
        port_arrival_date: first(PORT_ARRIVAL),
        delivery_order_date: first(DELIVERY_ORDER),
        entry_registered_date: first(ENTRY_REGISTERED),
        customs_released_date: first(CUSTOMS_RELEASED),
        truck_allocated_date: first(TRUCK_ALLOCATED),
        port_departure_date: first(PORT_DEPARTURE),
        tunduma_arrival_date: first(TUNDUMA_ARRIVAL),
        tunduma_departure_date: first(TUNDUMA_DEPARTURE),
        nakonde_arrival_date: first(NAKONDE_ARRIVAL),
        nakonde_departure_date: first(NAKONDE_DEPARTURE),
        destination_border_arrival_date: first(DESTINATION_BORDER_ARRIVAL),
        border_release_date: first(BORDER_RELEASE),
        final_delivery_date: first(DELIVERED).or_else(|| first(EMPTY_RETURNED)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Shipment, ShipmentType};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap()
    }

    fn shipment(reference: &str, created_at: DateTime<Utc>) -> Shipment {
        Shipment {
            id: Uuid::new_v4(),
            reference: reference.to_string(),
            status: ShipmentStatus::InTransit,
            shipment_type: ShipmentType::Road,
            customer_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            origin: "Dar es Salaam".to_string(),
            destination: "Lubumbashi".to_string(),
            container_number: Some("MSCU1234567".to_string()),
            truck_number: None,
            bill_of_lading: None,
            created_at,
            updated_at: created_at,
            arrival_date: None,
        }
    }

    fn event(status: ShipmentStatus, hours: i64, location: Option<&str>) -> TimelineEvent {
        TimelineEvent {
            id: Uuid::new_v4(),
            shipment_id: Uuid::nil(),
            status,
            timestamp: base() + Duration::hours(hours),
            location: location.map(str::to_string),
            notes: None,
        }
    }

    fn with_events(events: Vec<TimelineEvent>) -> ShipmentWithTimeline {
        ShipmentWithTimeline {
            shipment: shipment("TRK-001", base()),
            customer_name: "Acme Mining".to_string(),
            events,
        }
    }

    #[test]
    fn test_first_matching_event_wins() {
        let rows = extract_daily_rows(vec![with_events(vec![
            event(ShipmentStatus::CustomsReleased, 30, None),
            event(ShipmentStatus::DocumentReceived, 1, None),
            event(ShipmentStatus::CustomsReleased, 20, None),
        ])]);

        let row = &rows[0];
        assert_eq!(row.document_received_date, Some(base() + Duration::hours(1)));
        assert_eq!(row.customs_released_date, Some(base() + Duration::hours(20)));
        assert!(row.port_arrival_date.is_none());
    }

    #[test]
    fn test_border_checkpoints_match_location() {
        let rows = extract_daily_rows(vec![with_events(vec![
            event(ShipmentStatus::ArrivedAtBorder, 10, Some("TUNDUMA border post")),
            event(ShipmentStatus::DepartedBorder, 12, Some("Tunduma")),
            event(ShipmentStatus::ArrivedAtBorder, 14, Some("nakonde")),
            event(ShipmentStatus::DepartedBorder, 16, None),
        ])]);

        let row = &rows[0];
        assert_eq!(row.tunduma_arrival_date, Some(base() + Duration::hours(10)));
        assert_eq!(row.tunduma_departure_date, Some(base() + Duration::hours(12)));
        assert_eq!(row.nakonde_arrival_date, Some(base() + Duration::hours(14)));
        assert!(row.nakonde_departure_date.is_none());
    }

    #[test]
    fn test_final_delivery_prefers_delivered() {
        let rows = extract_daily_rows(vec![with_events(vec![
            event(ShipmentStatus::EmptyReturned, 40, None),
            event(ShipmentStatus::Delivered, 60, None),
            event(ShipmentStatus::Delivered, 50, None),
        ])]);

        assert_eq!(rows[0].final_delivery_date, Some(base() + Duration::hours(50)));
    }

    #[test]
    fn test_final_delivery_falls_back_to_empty_returned() {
        let rows = extract_daily_rows(vec![with_events(vec![event(
            ShipmentStatus::EmptyReturned,
            40,
            None,
        )])]);
        assert_eq!(rows[0].final_delivery_date, Some(base() + Duration::hours(40)));

        let rows = extract_daily_rows(vec![with_events(vec![])]);
        assert!(rows[0].final_delivery_date.is_none());
    }

    #[test]
    fn test_rows_ordered_by_creation_then_reference() {
        let later = ShipmentWithTimeline {
            shipment: shipment("TRK-900", base() + Duration::hours(2)),
            customer_name: "Acme".to_string(),
            events: vec![],
        };
        let b = ShipmentWithTimeline {
            shipment: shipment("TRK-200", base()),
            customer_name: "Acme".to_string(),
            events: vec![],
        };
        let a = ShipmentWithTimeline {
            shipment: shipment("TRK-100", base()),
            customer_name: "Acme".to_string(),
            events: vec![],
        };

        let rows = extract_daily_rows(vec![later, b, a]);
        let refs: Vec<&str> = rows.iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(refs, vec!["TRK-100", "TRK-200", "TRK-900"]);
    }

    #[test]
    fn test_row_copies_shipment_identity() {
        let rows = extract_daily_rows(vec![with_events(vec![])]);
        assert_eq!(rows[0].customer_name, "Acme Mining");
        assert_eq!(rows[0].container_number.as_deref(), Some("MSCU1234567"));
        assert_eq!(rows[0].shipment_type, ShipmentType::Road);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_daily_rows(vec![]).is_empty());
    }
}
