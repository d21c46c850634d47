//! CSV export of daily operations rows.

use chrono::{DateTime, SecondsFormat, Utc};

use domain::models::DailyShipmentEntry;

const DAILY_HEADER: [&str; 27] = [
    "shipment_id",
    "reference",
    "customer_id",
    "customer_name",
    "type",
    "status",
    "origin",
    "destination",
    "container_number",
    "truck_number",
    "bill_of_lading",
    "created_at",
    "document_received_date",
    "documents_sent_date",
    "port_arrival_date",
    "delivery_order_date",
    "entry_registered_date",
    "customs_released_date",
    "truck_allocated_date",
    "port_departure_date",
    "tunduma_arrival_date",
    "tunduma_departure_date",
    "nakonde_arrival_date",
    "nakonde_departure_date",
    "destination_border_arrival_date",
    "border_release_date",
    "final_delivery_date",
];

/// Renders daily rows as CSV with a header line. Dates are RFC 3339; missing
/// values are empty cells.
pub fn daily_rows_to_csv(rows: &[DailyShipmentEntry]) -> String {
    let mut csv = String::new();
    csv.push_str(&DAILY_HEADER.join(","));
    csv.push('\n');

    for row in rows {
        let fields = [
            row.shipment_id.to_string(),
            escape(&row.reference),
            row.customer_id.to_string(),
            escape(&row.customer_name),
            row.shipment_type.as_str().to_string(),
            row.status.as_str().to_string(),
            escape(&row.origin),
            escape(&row.destination),
            optional_text(&row.container_number),
            optional_text(&row.truck_number),
            optional_text(&row.bill_of_lading),
            timestamp(&row.created_at),
            optional_timestamp(&row.document_received_date),
            optional_timestamp(&row.documents_sent_date),
            optional_timestamp(&row.port_arrival_date),
            optional_timestamp(&row.delivery_order_date),
            optional_timestamp(&row.entry_registered_date),
            optional_timestamp(&row.customs_released_date),
            optional_timestamp(&row.truck_allocated_date),
            optional_timestamp(&row.port_departure_date),
            optional_timestamp(&row.tunduma_arrival_date),
            optional_timestamp(&row.tunduma_departure_date),
            optional_timestamp(&row.nakonde_arrival_date),
            optional_timestamp(&row.nakonde_departure_date),
            optional_timestamp(&row.destination_border_arrival_date),
            optional_timestamp(&row.border_release_date),
            optional_timestamp(&row.final_delivery_date),
        ];
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }

    csv
}

/// Quotes a field containing a comma, quote or line break.
fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn optional_text(value: &Option<String>) -> String {
    value.as_deref().map(escape).unwrap_or_default()
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn optional_timestamp(value: &Option<DateTime<Utc>>) -> String {
    value.as_ref().map(timestamp).unwrap_or_default()
}
