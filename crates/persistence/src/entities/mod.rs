//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod report;

pub use report::{
    CompletedShipmentEntity, CustomerOptionEntity, CustomerShipmentRowEntity, GroupCountEntity,
    RouteCountEntity, ShipmentEntity, TimelineEventEntity, UserActivityEntity, UserOptionEntity,
};
