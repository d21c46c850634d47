//! Report data store abstraction.
//!
//! The engine reads everything it needs through [`ReportStore`]. The production
//! implementation lives in the persistence crate; [`InMemoryReportStore`] serves
//! tests and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    CompletedShipment, Customer, CustomerOption, CustomerShipmentSummary, CustomerShipments,
    Document, DocumentGroupField, DocumentStatus, GlobalDateWindow, GroupCount, Notification,
    RecordKind, RouteCount, Shipment, ShipmentGroupField, ShipmentScopedFilter,
    ShipmentWithTimeline, TimelineEvent, User, UserActivityRow, UserOption,
};

/// Read-only queries backing report generation.
///
/// Group-by results are ordered by count descending, then key ascending.
/// Implementations must not mutate any record.
#[async_trait::async_trait]
pub trait ReportStore: Send + Sync {
    /// Counts shipments matching `filter`.
    async fn count_shipments(&self, filter: &ShipmentScopedFilter) -> Result<i64, StoreError>;

    /// Counts customers, documents or users inside `window`.
    async fn count_records(
        &self,
        kind: RecordKind,
        window: &GlobalDateWindow,
    ) -> Result<i64, StoreError>;

    /// Counts documents in `status` uploaded inside `window`.
    async fn count_documents_with_status(
        &self,
        status: DocumentStatus,
        window: &GlobalDateWindow,
    ) -> Result<i64, StoreError>;

    async fn group_shipments(
        &self,
        field: ShipmentGroupField,
        filter: &ShipmentScopedFilter,
    ) -> Result<Vec<GroupCount>, StoreError>;

    async fn group_documents(
        &self,
        field: DocumentGroupField,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError>;

    async fn group_users_by_role(
        &self,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError>;

    async fn group_timeline_events_by_status(
        &self,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError>;

    async fn group_notifications_by_type(
        &self,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError>;

    /// Groups matching shipments by origin and destination, most frequent first.
    async fn top_routes(
        &self,
        filter: &ShipmentScopedFilter,
        limit: usize,
    ) -> Result<Vec<RouteCount>, StoreError>;

    /// Customers ranked by matching shipment count descending (ties by name,
    /// then id). Customers without matching shipments rank last with an empty
    /// listing; a customer restriction in `filter` narrows the customers too.
    async fn list_customers_with_shipments(
        &self,
        filter: &ShipmentScopedFilter,
        limit: usize,
    ) -> Result<Vec<CustomerShipments>, StoreError>;

    async fn list_completed_shipments(
        &self,
        filter: &ShipmentScopedFilter,
    ) -> Result<Vec<CompletedShipment>, StoreError>;

    /// Users created inside `window`, ranked by matching shipment count
    /// descending (ties by name, then id), with document uploads counted inside
    /// `window` only.
    async fn list_users_with_activity(
        &self,
        filter: &ShipmentScopedFilter,
        window: &GlobalDateWindow,
        limit: usize,
    ) -> Result<Vec<UserActivityRow>, StoreError>;

    /// Matching shipments with their customer name and complete timeline.
    async fn list_shipments_with_timeline(
        &self,
        filter: &ShipmentScopedFilter,
    ) -> Result<Vec<ShipmentWithTimeline>, StoreError>;

    /// Active customers ordered by name.
    async fn list_filter_customers(&self) -> Result<Vec<CustomerOption>, StoreError>;

    /// Active users ordered by name.
    async fn list_filter_users(&self) -> Result<Vec<UserOption>, StoreError>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Store over plain vectors of records.
///
/// Can be told to fail every query, or one named query, to exercise error paths,
/// and to stall one named query to exercise timeouts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportStore {
    customers: Vec<Customer>,
    users: Vec<User>,
    shipments: Vec<Shipment>,
    documents: Vec<Document>,
    timeline_events: Vec<TimelineEvent>,
    notifications: Vec<Notification>,
    failure: Option<SimulatedFailure>,
    delay: Option<(&'static str, Duration)>,
    queries: Arc<AtomicUsize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimulatedFailure {
    Every,
    Query(&'static str),
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every query fails.
    pub fn failing() -> Self {
        Self {
            failure: Some(SimulatedFailure::Every),
            ..Self::default()
        }
    }

    /// Makes the named query fail.
    pub fn failing_on(mut self, query: &'static str) -> Self {
        self.failure = Some(SimulatedFailure::Query(query));
        self
    }

    /// Makes the named query wait `delay` before answering.
    pub fn delaying(mut self, query: &'static str, delay: Duration) -> Self {
        self.delay = Some((query, delay));
        self
    }

    pub fn with_customers(mut self, customers: Vec<Customer>) -> Self {
        self.customers = customers;
        self
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    pub fn with_shipments(mut self, shipments: Vec<Shipment>) -> Self {
        self.shipments = shipments;
        self
    }

    pub fn with_documents(mut self, documents: Vec<Document>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_timeline_events(mut self, events: Vec<TimelineEvent>) -> Self {
        self.timeline_events = events;
        self
    }

    pub fn with_notifications(mut self, notifications: Vec<Notification>) -> Self {
        self.notifications = notifications;
        self
    }

    /// Number of queries issued so far, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    async fn begin(&self, query: &'static str) -> Result<(), StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if let Some((name, delay)) = self.delay {
            if name == query {
                tokio::time::sleep(delay).await;
            }
        }

        let fails = match self.failure {
            Some(SimulatedFailure::Every) => true,
            Some(SimulatedFailure::Query(name)) => name == query,
            None => false,
        };

        if fails {
            tracing::warn!(query = query, "In-memory store simulating failure");
            return Err(StoreError::query(query, "simulated failure"));
        }

        tracing::trace!(query = query, "In-memory store query");
        Ok(())
    }

    fn matching_shipments<'a>(
        &'a self,
        filter: &'a ShipmentScopedFilter,
    ) -> impl Iterator<Item = &'a Shipment> + 'a {
        self.shipments.iter().filter(move |s| filter.matches(s))
    }

    fn customer_name(&self, id: Uuid) -> String {
        self.customers
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    fn document_count(&self, shipment_id: Uuid) -> i64 {
        self.documents
            .iter()
            .filter(|d| d.shipment_id == shipment_id)
            .count() as i64
    }
}

/// Orders tallies by count descending, then key ascending.
fn into_groups<I: IntoIterator<Item = &'static str>>(keys: I) -> Vec<GroupCount> {
    let mut tally: BTreeMap<&'static str, i64> = BTreeMap::new();
    for key in keys {
        *tally.entry(key).or_insert(0) += 1;
    }

    let mut groups: Vec<GroupCount> = tally
        .into_iter()
        .map(|(key, count)| GroupCount::new(key, count))
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    groups
}

#[async_trait::async_trait]
impl ReportStore for InMemoryReportStore {
    async fn count_shipments(&self, filter: &ShipmentScopedFilter) -> Result<i64, StoreError> {
        self.begin("count_shipments").await?;
        Ok(self.matching_shipments(filter).count() as i64)
    }

    async fn count_records(
        &self,
        kind: RecordKind,
        window: &GlobalDateWindow,
    ) -> Result<i64, StoreError> {
        self.begin("count_records").await?;
        let count = match kind {
            RecordKind::Customers => self
                .customers
                .iter()
                .filter(|c| window.contains(c.created_at))
                .count(),
            RecordKind::Documents => self
                .documents
                .iter()
                .filter(|d| window.contains(d.uploaded_at))
                .count(),
            RecordKind::Users => self
                .users
                .iter()
                .filter(|u| window.contains(u.created_at))
                .count(),
        };
        Ok(count as i64)
    }

    async fn count_documents_with_status(
        &self,
        status: DocumentStatus,
        window: &GlobalDateWindow,
    ) -> Result<i64, StoreError> {
        self.begin("count_documents_with_status").await?;
        Ok(self
            .documents
            .iter()
            .filter(|d| d.status == status && window.contains(d.uploaded_at))
            .count() as i64)
    }

    async fn group_shipments(
        &self,
        field: ShipmentGroupField,
        filter: &ShipmentScopedFilter,
    ) -> Result<Vec<GroupCount>, StoreError> {
        self.begin("group_shipments").await?;
        Ok(into_groups(self.matching_shipments(filter).map(|s| match field {
            ShipmentGroupField::Status => s.status.as_str(),
            ShipmentGroupField::Type => s.shipment_type.as_str(),
        })))
    }

    async fn group_documents(
        &self,
        field: DocumentGroupField,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError> {
        self.begin("group_documents").await?;
        Ok(into_groups(
            self.documents
                .iter()
                .filter(|d| window.contains(d.uploaded_at))
                .map(|d| match field {
                    DocumentGroupField::Status => d.status.as_str(),
                    DocumentGroupField::Type => d.document_type.as_str(),
                }),
        ))
    }

    async fn group_users_by_role(
        &self,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError> {
        self.begin("group_users_by_role").await?;
        Ok(into_groups(
            self.users
                .iter()
                .filter(|u| window.contains(u.created_at))
                .map(|u| u.role.as_str()),
        ))
    }

    async fn group_timeline_events_by_status(
        &self,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError> {
        self.begin("group_timeline_events_by_status").await?;
        Ok(into_groups(
            self.timeline_events
                .iter()
                .filter(|e| window.contains(e.timestamp))
                .map(|e| e.status.as_str()),
        ))
    }

    async fn group_notifications_by_type(
        &self,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError> {
        self.begin("group_notifications_by_type").await?;
        Ok(into_groups(
            self.notifications
                .iter()
                .filter(|n| window.contains(n.timestamp))
                .map(|n| n.notification_type.as_str()),
        ))
    }

    async fn top_routes(
        &self,
        filter: &ShipmentScopedFilter,
        limit: usize,
    ) -> Result<Vec<RouteCount>, StoreError> {
        self.begin("top_routes").await?;

        let mut tally: HashMap<(&str, &str), i64> = HashMap::new();
        for shipment in self.matching_shipments(filter) {
            *tally
                .entry((shipment.origin.as_str(), shipment.destination.as_str()))
                .or_insert(0) += 1;
        }

        let mut routes: Vec<RouteCount> = tally
            .into_iter()
            .map(|((origin, destination), count)| RouteCount {
                origin: origin.to_string(),
                destination: destination.to_string(),
                count,
            })
            .collect();
        routes.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.origin.cmp(&b.origin))
                .then_with(|| a.destination.cmp(&b.destination))
        });
        routes.truncate(limit);
        Ok(routes)
    }

    async fn list_customers_with_shipments(
        &self,
        filter: &ShipmentScopedFilter,
        limit: usize,
    ) -> Result<Vec<CustomerShipments>, StoreError> {
        self.begin("list_customers_with_shipments").await?;

        let mut customers: Vec<CustomerShipments> = self
            .customers
            .iter()
            .filter(|customer| filter.customer_id.map_or(true, |id| id == customer.id))
            .map(|customer| {
                let mut shipments: Vec<&Shipment> = self
                    .matching_shipments(filter)
                    .filter(|s| s.customer_id == customer.id)
                    .collect();
                shipments.sort_by_key(|s| (s.created_at, s.id));

                CustomerShipments {
                    customer_id: customer.id,
                    customer_name: customer.name.clone(),
                    shipments: shipments
                        .into_iter()
                        .map(|s| CustomerShipmentSummary {
                            id: s.id,
                            status: s.status,
                            created_at: s.created_at,
                            updated_at: s.updated_at,
                            document_count: self.document_count(s.id),
                        })
                        .collect(),
                }
            })
            .collect();

        customers.sort_by(|a, b| {
            b.shipments
                .len()
                .cmp(&a.shipments.len())
                .then_with(|| a.customer_name.cmp(&b.customer_name))
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        });
        customers.truncate(limit);
        Ok(customers)
    }

    async fn list_completed_shipments(
        &self,
        filter: &ShipmentScopedFilter,
    ) -> Result<Vec<CompletedShipment>, StoreError> {
        self.begin("list_completed_shipments").await?;
        Ok(self
            .matching_shipments(filter)
            .map(|s| CompletedShipment {
                origin: s.origin.clone(),
                destination: s.destination.clone(),
                created_at: s.created_at,
                updated_at: s.updated_at,
            })
            .collect())
    }

    async fn list_users_with_activity(
        &self,
        filter: &ShipmentScopedFilter,
        window: &GlobalDateWindow,
        limit: usize,
    ) -> Result<Vec<UserActivityRow>, StoreError> {
        self.begin("list_users_with_activity").await?;

        let mut rows: Vec<UserActivityRow> = self
            .users
            .iter()
            .filter(|user| window.contains(user.created_at))
            .map(|user| UserActivityRow {
                user_id: user.id,
                name: user.name.clone(),
                role: user.role,
                updated_at: user.updated_at,
                shipment_count: self
                    .matching_shipments(filter)
                    .filter(|s| s.created_by == user.id)
                    .count() as i64,
                document_count: self
                    .documents
                    .iter()
                    .filter(|d| d.uploaded_by == user.id && window.contains(d.uploaded_at))
                    .count() as i64,
            })
            .collect();

        rows.sort_by(|a, b| {
            b.shipment_count
                .cmp(&a.shipment_count)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn list_shipments_with_timeline(
        &self,
        filter: &ShipmentScopedFilter,
    ) -> Result<Vec<ShipmentWithTimeline>, StoreError> {
        self.begin("list_shipments_with_timeline").await?;
        Ok(self
            .matching_shipments(filter)
            .map(|shipment| ShipmentWithTimeline {
                shipment: shipment.clone(),
                customer_name: self.customer_name(shipment.customer_id),
                events: self
                    .timeline_events
                    .iter()
                    .filter(|e| e.shipment_id == shipment.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn list_filter_customers(&self) -> Result<Vec<CustomerOption>, StoreError> {
        self.begin("list_filter_customers").await?;
        let mut options: Vec<CustomerOption> = self
            .customers
            .iter()
            .filter(|c| c.is_active)
            .map(|c| CustomerOption {
                id: c.id,
                name: c.name.clone(),
            })
            .collect();
        options.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(options)
    }

    async fn list_filter_users(&self) -> Result<Vec<UserOption>, StoreError> {
        self.begin("list_filter_users").await?;
        let mut options: Vec<UserOption> = self
            .users
            .iter()
            .filter(|u| u.is_active)
            .map(|u| UserOption {
                id: u.id,
                name: u.name.clone(),
                role: u.role,
            })
            .collect();
        options.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(options)
    }
}
