//! Domain models for the report engine.

pub mod customer;
pub mod document;
pub mod notification;
pub mod report;
pub mod report_filter;
pub mod report_source;
pub mod shipment;
pub mod timeline_event;
pub mod user;

pub use customer::Customer;
pub use document::{Document, DocumentStatus, DocumentType};
pub use notification::{Notification, NotificationType};
pub use report::{
    CustomerAnalytics, CustomerOption, DailyShipmentEntry, DistributionEntry, FilterOptions,
    MonthlyTrend, PerformanceMetrics, ReportPeriod, ReportResult, ReportSummary, RouteAnalytics,
    TimelineAnalytics, UserActivity, UserOption,
};
pub use report_filter::{
    DateRange, DateWindow, GlobalDateWindow, ReportFilter, ReportScope, ReportType,
    ResolvedFilter, ShipmentScopedFilter,
};
pub use report_source::{
    CompletedShipment, CustomerShipmentSummary, CustomerShipments, DocumentGroupField,
    GroupCount, RecordKind, RouteCount, ShipmentGroupField, ShipmentWithTimeline,
    UserActivityRow,
};
pub use shipment::{Shipment, ShipmentStatus, ShipmentType, COMPLETED_STATUSES};
pub use timeline_event::TimelineEvent;
pub use user::{User, UserRole};
