//! Report repository: the PostgreSQL implementation of [`ReportStore`].
//!
//! Every statement is static SQL. Optional predicates follow the
//! `($n::TYPE IS NULL OR ...)` form so one statement serves every filter shape.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use domain::error::{BoxError, StoreError};
use domain::models::{
    CompletedShipment, CustomerOption, CustomerShipments,
    DocumentGroupField, DocumentStatus, GlobalDateWindow, GroupCount, RecordKind, RouteCount,
    ShipmentGroupField, ShipmentScopedFilter, ShipmentWithTimeline, UserActivityRow, UserOption,
};
use domain::services::ReportStore;

use crate::entities::{
    CompletedShipmentEntity, CustomerOptionEntity, CustomerShipmentRowEntity, GroupCountEntity,
    RouteCountEntity, ShipmentEntity, TimelineEventEntity, UserActivityEntity,
    UserOptionEntity,
};
use crate::metrics::QueryTimer;

/// Shipment predicate over alias `s`, bound to `$1..$6` by `bind_shipment_filter!`.
macro_rules! shipment_predicate {
    () => {
        r#"($1::TEXT[] IS NULL OR s.status = ANY($1))
              AND ($2::TEXT[] IS NULL OR s.type = ANY($2))
              AND ($3::UUID IS NULL OR s.customer_id = $3)
              AND ($4::UUID IS NULL OR s.created_by = $4)
              AND ($5::TIMESTAMPTZ IS NULL OR s.created_at >= $5)
              AND ($6::TIMESTAMPTZ IS NULL OR s.created_at < $6)"#
    };
}

/// Binds a [`ShipmentBinds`] as parameters `$1..$6`.
macro_rules! bind_shipment_filter {
    ($query:expr, $binds:expr) => {
        $query
            .bind($binds.statuses.clone())
            .bind($binds.types.clone())
            .bind($binds.customer_id)
            .bind($binds.created_by)
            .bind($binds.start)
            .bind($binds.end)
    };
}

/// Bind values for a [`ShipmentScopedFilter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ShipmentBinds {
    statuses: Option<Vec<String>>,
    types: Option<Vec<String>>,
    customer_id: Option<Uuid>,
    created_by: Option<Uuid>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl From<&ShipmentScopedFilter> for ShipmentBinds {
    fn from(filter: &ShipmentScopedFilter) -> Self {
        Self {
            statuses: filter
                .statuses
                .as_ref()
                .map(|set| set.iter().map(|s| s.as_str().to_string()).collect()),
            types: filter
                .types
                .as_ref()
                .map(|set| set.iter().map(|t| t.as_str().to_string()).collect()),
            customer_id: filter.customer_id,
            created_by: filter.created_by,
            start: filter.created.start,
            end: filter.created.end,
        }
    }
}

/// Table and timestamp column counted for a record kind.
fn record_source(kind: RecordKind) -> (&'static str, &'static str) {
    match kind {
        RecordKind::Customers => ("customers", "created_at"),
        RecordKind::Documents => ("documents", "uploaded_at"),
        RecordKind::Users => ("users", "created_at"),
    }
}

/// Logs a failed report query and wraps the cause.
fn query_failed(query: &'static str, error: impl Into<BoxError>) -> StoreError {
    let error = StoreError::query(query, error);
    tracing::error!(query = query, error = %error, "Report query failed");
    error
}

/// Folds adjacent rows of the same customer into one entry, keeping row order.
///
/// A customer without matching shipments arrives as a single row with no
/// shipment columns and yields an empty listing.
fn group_customer_rows(
    rows: Vec<CustomerShipmentRowEntity>,
) -> Result<Vec<CustomerShipments>, String> {
    let mut customers: Vec<CustomerShipments> = Vec::new();

    for row in rows {
        let summary = row.shipment_summary()?;

        let continues = customers
            .last()
            .map_or(false, |current| current.customer_id == row.customer_id);

        match customers.last_mut() {
            Some(current) if continues => current.shipments.extend(summary),
            _ => customers.push(CustomerShipments {
                customer_id: row.customer_id,
                customer_name: row.customer_name,
                shipments: summary.into_iter().collect(),
            }),
        }
    }

    Ok(customers)
}

/// Repository for the read-only report queries.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    /// Creates a new ReportRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_groups(
        &self,
        query_name: &'static str,
        sql: &str,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError> {
        let timer = QueryTimer::new(query_name);
        let window = window.window();

        let result = sqlx::query_as::<_, GroupCountEntity>(sql)
            .bind(window.start)
            .bind(window.end)
            .fetch_all(&self.pool)
            .await;

        timer.record();
        let rows = result.map_err(|e| query_failed(query_name, e))?;
        Ok(rows.into_iter().map(GroupCount::from).collect())
    }
}

#[async_trait::async_trait]
impl ReportStore for ReportRepository {
    async fn count_shipments(&self, filter: &ShipmentScopedFilter) -> Result<i64, StoreError> {
        let timer = QueryTimer::new("count_shipments");
        let binds = ShipmentBinds::from(filter);

        let result = bind_shipment_filter!(
            sqlx::query_scalar::<_, i64>(concat!(
                "SELECT COUNT(*) FROM shipments s WHERE ",
                shipment_predicate!()
            )),
            binds
        )
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result.map_err(|e| query_failed("count_shipments", e))
    }

    async fn count_records(
        &self,
        kind: RecordKind,
        window: &GlobalDateWindow,
    ) -> Result<i64, StoreError> {
        let timer = QueryTimer::new("count_records");
        let (table, column) = record_source(kind);
        let window = window.window();

        let query = format!(
            "SELECT COUNT(*) FROM {table} \
             WHERE ($1::TIMESTAMPTZ IS NULL OR {column} >= $1) \
               AND ($2::TIMESTAMPTZ IS NULL OR {column} < $2)"
        );

        let result = sqlx::query_scalar::<_, i64>(&query)
            .bind(window.start)
            .bind(window.end)
            .fetch_one(&self.pool)
            .await;

        timer.record();
        result.map_err(|e| query_failed("count_records", e))
    }

    async fn count_documents_with_status(
        &self,
        status: DocumentStatus,
        window: &GlobalDateWindow,
    ) -> Result<i64, StoreError> {
        let timer = QueryTimer::new("count_documents_with_status");
        let window = window.window();

        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM documents
            WHERE status = $1
              AND ($2::TIMESTAMPTZ IS NULL OR uploaded_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR uploaded_at < $3)
            "#,
        )
        .bind(status.as_str())
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await;

        timer.record();
        result.map_err(|e| query_failed("count_documents_with_status", e))
    }

    async fn group_shipments(
        &self,
        field: ShipmentGroupField,
        filter: &ShipmentScopedFilter,
    ) -> Result<Vec<GroupCount>, StoreError> {
        let timer = QueryTimer::new("group_shipments");
        let binds = ShipmentBinds::from(filter);
        let column = match field {
            ShipmentGroupField::Status => "s.status",
            ShipmentGroupField::Type => "s.type",
        };

        let query = format!(
            "SELECT {column} AS group_key, COUNT(*) AS count FROM shipments s WHERE {} \
             GROUP BY {column} ORDER BY count DESC, group_key ASC",
            shipment_predicate!()
        );

        let result = bind_shipment_filter!(sqlx::query_as::<_, GroupCountEntity>(&query), binds)
            .fetch_all(&self.pool)
            .await;

        timer.record();
        let rows = result.map_err(|e| query_failed("group_shipments", e))?;
        Ok(rows.into_iter().map(GroupCount::from).collect())
    }

    async fn group_documents(
        &self,
        field: DocumentGroupField,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError> {
        let column = match field {
            DocumentGroupField::Status => "status",
            DocumentGroupField::Type => "type",
        };

        let query = format!(
            "SELECT {column} AS group_key, COUNT(*) AS count FROM documents \
             WHERE ($1::TIMESTAMPTZ IS NULL OR uploaded_at >= $1) \
               AND ($2::TIMESTAMPTZ IS NULL OR uploaded_at < $2) \
             GROUP BY {column} ORDER BY count DESC, group_key ASC"
        );

        self.fetch_groups("group_documents", &query, window).await
    }

    async fn group_users_by_role(
        &self,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError> {
        self.fetch_groups(
            "group_users_by_role",
            r#"
            SELECT role AS group_key, COUNT(*) AS count FROM users
            WHERE ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at < $2)
            GROUP BY role
            ORDER BY count DESC, group_key ASC
            "#,
            window,
        )
        .await
    }

    async fn group_timeline_events_by_status(
        &self,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError> {
        self.fetch_groups(
            "group_timeline_events_by_status",
            r#"
            SELECT status AS group_key, COUNT(*) AS count FROM timeline_events
            WHERE ($1::TIMESTAMPTZ IS NULL OR timestamp >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR timestamp < $2)
            GROUP BY status
            ORDER BY count DESC, group_key ASC
            "#,
            window,
        )
        .await
    }

    async fn group_notifications_by_type(
        &self,
        window: &GlobalDateWindow,
    ) -> Result<Vec<GroupCount>, StoreError> {
        self.fetch_groups(
            "group_notifications_by_type",
            r#"
            SELECT type AS group_key, COUNT(*) AS count FROM notifications
            WHERE ($1::TIMESTAMPTZ IS NULL OR timestamp >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR timestamp < $2)
            GROUP BY type
            ORDER BY count DESC, group_key ASC
            "#,
            window,
        )
        .await
    }

    async fn top_routes(
        &self,
        filter: &ShipmentScopedFilter,
        limit: usize,
    ) -> Result<Vec<RouteCount>, StoreError> {
        let timer = QueryTimer::new("top_routes");
        let binds = ShipmentBinds::from(filter);

        let result = bind_shipment_filter!(
            sqlx::query_as::<_, RouteCountEntity>(concat!(
                "SELECT s.origin, s.destination, COUNT(*) AS count FROM shipments s WHERE ",
                shipment_predicate!(),
                " GROUP BY s.origin, s.destination",
                " ORDER BY count DESC, s.origin ASC, s.destination ASC",
                " LIMIT $7"
            )),
            binds
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        let rows = result.map_err(|e| query_failed("top_routes", e))?;
        Ok(rows.into_iter().map(RouteCount::from).collect())
    }

    async fn list_customers_with_shipments(
        &self,
        filter: &ShipmentScopedFilter,
        limit: usize,
    ) -> Result<Vec<CustomerShipments>, StoreError> {
        let timer = QueryTimer::new("list_customers_with_shipments");
        let binds = ShipmentBinds::from(filter);

        let result = bind_shipment_filter!(
            sqlx::query_as::<_, CustomerShipmentRowEntity>(concat!(
                r#"
                WITH matching AS (
                    SELECT s.id, s.customer_id, s.status, s.created_at, s.updated_at
                    FROM shipments s
                    WHERE "#,
                shipment_predicate!(),
                r#"
                ),
                ranked AS (
                    SELECT c.id, c.name, COUNT(m.id) AS shipment_count
                    FROM customers c
                    LEFT JOIN matching m ON m.customer_id = c.id
                    WHERE ($3::UUID IS NULL OR c.id = $3)
                    GROUP BY c.id, c.name
                    ORDER BY shipment_count DESC, c.name ASC, c.id ASC
                    LIMIT $7
                )
                SELECT
                    r.id AS customer_id, r.name AS customer_name,
                    m.id AS shipment_id, m.status, m.created_at, m.updated_at,
                    (SELECT COUNT(*) FROM documents d WHERE d.shipment_id = m.id) AS document_count
                FROM ranked r
                LEFT JOIN matching m ON m.customer_id = r.id
                ORDER BY r.shipment_count DESC, r.name ASC, r.id ASC, m.created_at ASC, m.id ASC
                "#
            )),
            binds
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        let rows = result.map_err(|e| query_failed("list_customers_with_shipments", e))?;
        group_customer_rows(rows).map_err(|e| query_failed("list_customers_with_shipments", e))
    }

    async fn list_completed_shipments(
        &self,
        filter: &ShipmentScopedFilter,
    ) -> Result<Vec<CompletedShipment>, StoreError> {
        let timer = QueryTimer::new("list_completed_shipments");
        let binds = ShipmentBinds::from(filter);

        let result = bind_shipment_filter!(
            sqlx::query_as::<_, CompletedShipmentEntity>(concat!(
                "SELECT s.origin, s.destination, s.created_at, s.updated_at FROM shipments s WHERE ",
                shipment_predicate!(),
                " ORDER BY s.created_at ASC, s.id ASC"
            )),
            binds
        )
        .fetch_all(&self.pool)
        .await;

        timer.record();
        let rows = result.map_err(|e| query_failed("list_completed_shipments", e))?;
        Ok(rows.into_iter().map(CompletedShipment::from).collect())
    }

    async fn list_users_with_activity(
        &self,
        filter: &ShipmentScopedFilter,
        window: &GlobalDateWindow,
        limit: usize,
    ) -> Result<Vec<UserActivityRow>, StoreError> {
        let timer = QueryTimer::new("list_users_with_activity");
        let binds = ShipmentBinds::from(filter);
        let window = window.window();

        let result = bind_shipment_filter!(
            sqlx::query_as::<_, UserActivityEntity>(concat!(
                r#"
                SELECT
                    u.id AS user_id, u.name, u.role, u.updated_at,
                    (SELECT COUNT(*) FROM shipments s WHERE s.created_by = u.id AND "#,
                shipment_predicate!(),
                r#") AS shipment_count,
                    (SELECT COUNT(*) FROM documents d
                      WHERE d.uploaded_by = u.id
                        AND ($7::TIMESTAMPTZ IS NULL OR d.uploaded_at >= $7)
                        AND ($8::TIMESTAMPTZ IS NULL OR d.uploaded_at < $8)) AS document_count
                FROM users u
                WHERE ($7::TIMESTAMPTZ IS NULL OR u.created_at >= $7)
                  AND ($8::TIMESTAMPTZ IS NULL OR u.created_at < $8)
                ORDER BY shipment_count DESC, u.name ASC, u.id ASC
                LIMIT $9
                "#
            )),
            binds
        )
        .bind(window.start)
        .bind(window.end)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
            .map_err(|e| query_failed("list_users_with_activity", e))?
            .into_iter()
            .map(UserActivityEntity::into_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_failed("list_users_with_activity", e))
    }

    async fn list_shipments_with_timeline(
        &self,
        filter: &ShipmentScopedFilter,
    ) -> Result<Vec<ShipmentWithTimeline>, StoreError> {
        const QUERY: &str = "list_shipments_with_timeline";
        let timer = QueryTimer::new(QUERY);
        let binds = ShipmentBinds::from(filter);

        let shipments = bind_shipment_filter!(
            sqlx::query_as::<_, ShipmentEntity>(concat!(
                r#"
                SELECT
                    s.id, s.reference, s.status, s.type AS shipment_type,
                    s.customer_id, c.name AS customer_name, s.created_by,
                    s.origin, s.destination, s.container_number, s.truck_number,
                    s.bill_of_lading, s.created_at, s.updated_at, s.arrival_date
                FROM shipments s
                JOIN customers c ON c.id = s.customer_id
                WHERE "#,
                shipment_predicate!(),
                " ORDER BY s.created_at ASC, s.reference ASC"
            )),
            binds
        )
        .fetch_all(&self.pool)
        .await;

        let shipments = match shipments {
            Ok(shipments) => shipments,
            Err(e) => return timer.observe(Err(query_failed(QUERY, e))),
        };

        let ids: Vec<Uuid> = shipments.iter().map(|s| s.id).collect();
        let events = timer.observe(
            sqlx::query_as::<_, TimelineEventEntity>(
                r#"
                SELECT id, shipment_id, status, timestamp, location, notes
                FROM timeline_events
                WHERE shipment_id = ANY($1)
                ORDER BY timestamp ASC, id ASC
                "#,
            )
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed(QUERY, e)),
        )?;

        let mut by_shipment: HashMap<Uuid, Vec<_>> = HashMap::new();
        for event in events {
            let event = event
                .into_domain()
                .map_err(|e| query_failed(QUERY, e))?;
            by_shipment.entry(event.shipment_id).or_default().push(event);
        }

        shipments
            .into_iter()
            .map(|entity| {
                let (shipment, customer_name) =
                    entity.into_domain().map_err(|e| query_failed(QUERY, e))?;
                let events = by_shipment.remove(&shipment.id).unwrap_or_default();
                Ok(ShipmentWithTimeline {
                    shipment,
                    customer_name,
                    events,
                })
            })
            .collect()
    }

    async fn list_filter_customers(&self) -> Result<Vec<CustomerOption>, StoreError> {
        let timer = QueryTimer::new("list_filter_customers");

        let result = sqlx::query_as::<_, CustomerOptionEntity>(
            "SELECT id, name FROM customers WHERE is_active = TRUE ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await;

        timer.record();
        let rows = result.map_err(|e| query_failed("list_filter_customers", e))?;
        Ok(rows.into_iter().map(CustomerOption::from).collect())
    }

    async fn list_filter_users(&self) -> Result<Vec<UserOption>, StoreError> {
        let timer = QueryTimer::new("list_filter_users");

        let result = sqlx::query_as::<_, UserOptionEntity>(
            "SELECT id, name, role FROM users WHERE is_active = TRUE ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
            .map_err(|e| query_failed("list_filter_users", e))?
            .into_iter()
            .map(UserOptionEntity::into_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| query_failed("list_filter_users", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{DateWindow, ShipmentStatus, ShipmentType};

    fn row(customer_id: Uuid, name: &str, status: &str) -> CustomerShipmentRowEntity {
        CustomerShipmentRowEntity {
            customer_id,
            customer_name: name.to_string(),
            shipment_id: Some(Uuid::new_v4()),
            status: Some(status.to_string()),
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
            document_count: 1,
        }
    }

    fn idle_row(customer_id: Uuid, name: &str) -> CustomerShipmentRowEntity {
        CustomerShipmentRowEntity {
            customer_id,
            customer_name: name.to_string(),
            shipment_id: None,
            status: None,
            created_at: None,
            updated_at: None,
            document_count: 0,
        }
    }

    #[test]
    fn test_shipment_binds_from_filter() {
        let filter = ShipmentScopedFilter {
            statuses: Some(vec![ShipmentStatus::Delivered, ShipmentStatus::EmptyReturned]),
            types: Some(vec![ShipmentType::Air]),
            customer_id: None,
            created_by: None,
            created: DateWindow::unbounded(),
        };

        let binds = ShipmentBinds::from(&filter);
        assert_eq!(
            binds.statuses,
            Some(vec!["DELIVERED".to_string(), "EMPTY_RETURNED".to_string()])
        );
        assert_eq!(binds.types, Some(vec!["AIR".to_string()]));
        assert!(binds.start.is_none() && binds.end.is_none());
    }

    #[test]
    fn test_unrestricted_filter_binds_nulls() {
        assert_eq!(
            ShipmentBinds::from(&ShipmentScopedFilter::default()),
            ShipmentBinds::default()
        );
    }

    #[test]
    fn test_record_source() {
        assert_eq!(record_source(RecordKind::Documents), ("documents", "uploaded_at"));
        assert_eq!(record_source(RecordKind::Users), ("users", "created_at"));
    }

    #[test]
    fn test_group_customer_rows_keeps_order() {
        let acme = Uuid::new_v4();
        let beta = Uuid::new_v4();
        let rows = vec![
            row(acme, "Acme", "DELIVERED"),
            row(acme, "Acme", "IN_TRANSIT"),
            row(beta, "Beta", "CREATED"),
        ];

        let customers = group_customer_rows(rows).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].customer_id, acme);
        assert_eq!(customers[0].shipments.len(), 2);
        assert_eq!(customers[1].shipments[0].status, ShipmentStatus::Created);
    }

    #[test]
    fn test_group_customer_rows_keeps_idle_customer() {
        let acme = Uuid::new_v4();
        let idle = Uuid::new_v4();
        let rows = vec![row(acme, "Acme", "DELIVERED"), idle_row(idle, "Idle")];

        let customers = group_customer_rows(rows).unwrap();
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[1].customer_id, idle);
        assert!(customers[1].shipments.is_empty());
    }

    #[test]
    fn test_group_customer_rows_rejects_unknown_status() {
        let rows = vec![row(Uuid::new_v4(), "Acme", "MISPLACED")];
        assert!(group_customer_rows(rows).is_err());
    }

    #[test]
    fn test_query_failed_keeps_query_name() {
        let err = query_failed("list_shipments_with_timeline", "connection reset");
        assert!(matches!(
            err,
            StoreError::Query { query: "list_shipments_with_timeline", .. }
        ));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_shipment_predicate_uses_six_parameters() {
        let predicate = shipment_predicate!();
        for n in 1..=6 {
            assert!(predicate.contains(&format!("${}", n)));
        }
        assert!(!predicate.contains("$7"));
    }
}
