//! Report aggregation engine.
//!
//! Resolves the filter, fans the store queries out concurrently, feeds the joined
//! results to the calculators and assembles one [`ReportResult`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use shared::calendar::trailing_months;

use super::calculators::{self, MonthCounts, PerformanceCounts};
use super::daily_timeline::extract_daily_rows;
use super::filter_resolver::resolve_filter;
use super::report_store::ReportStore;
use crate::error::{ReportError, StoreError};
use crate::models::{
    CompletedShipment, CustomerShipments, DateWindow, DocumentGroupField, DocumentStatus,
    FilterOptions, GlobalDateWindow, GroupCount, RecordKind, ReportFilter, ReportPeriod,
    ReportResult, ReportScope, ReportSummary, ResolvedFilter, RouteCount, ShipmentGroupField,
    ShipmentScopedFilter, ShipmentStatus, ShipmentWithTimeline, UserActivityRow,
    COMPLETED_STATUSES,
};

/// Number of calendar months in the trend section.
pub const TREND_MONTHS: u32 = 12;

/// Tunables for report generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Upper bound on the whole query phase; `None` waits indefinitely.
    pub query_timeout: Option<Duration>,
    pub customer_limit: usize,
    pub user_limit: usize,
    pub route_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            query_timeout: None,
            customer_limit: 20,
            user_limit: 15,
            route_limit: 10,
        }
    }
}

/// Generates reports from a [`ReportStore`].
pub struct ReportEngine<S: ReportStore + ?Sized> {
    store: Arc<S>,
    settings: EngineSettings,
}

impl<S: ReportStore + ?Sized> Clone for ReportEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
        }
    }
}

struct SummaryCounts {
    total_shipments: i64,
    active_shipments: i64,
    completed_shipments: i64,
    customers: i64,
    documents: i64,
    users: i64,
    verified_documents: i64,
}

struct Groupings {
    shipment_status: Vec<GroupCount>,
    shipment_type: Vec<GroupCount>,
    document_status: Vec<GroupCount>,
    document_type: Vec<GroupCount>,
    user_role: Vec<GroupCount>,
    timeline_status: Vec<GroupCount>,
    notification_type: Vec<GroupCount>,
}

struct Listings {
    customers: Vec<CustomerShipments>,
    completed: Vec<CompletedShipment>,
    routes: Vec<RouteCount>,
    users: Vec<UserActivityRow>,
}

struct QueryResults {
    counts: SummaryCounts,
    groups: Groupings,
    listings: Listings,
    months: Vec<MonthCounts>,
    daily: Option<Vec<ShipmentWithTimeline>>,
}

impl<S: ReportStore + ?Sized> ReportEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_settings(store, EngineSettings::default())
    }

    pub fn with_settings(store: Arc<S>, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Builds the report described by `filter` as of `now`.
    ///
    /// Validation runs before any query. Any failing query aborts the whole
    /// report and cancels the queries still in flight.
    pub async fn generate_report(
        &self,
        filter: &ReportFilter,
        now: DateTime<Utc>,
    ) -> Result<ReportResult, ReportError> {
        let resolved = resolve_filter(filter, now)?;
        let started = Instant::now();

        tracing::debug!(
            report_type = %resolved.report_type,
            window_start = ?resolved.window.window().start,
            window_end = ?resolved.window.window().end,
            "Generating report"
        );

        let outcome = match self.run_queries(&resolved, now).await {
            Ok(results) => assemble(&resolved, now, self.settings.route_limit, results),
            Err(e) => Err(e.into()),
        };

        match &outcome {
            Ok(report) => tracing::info!(
                report_type = %report.report_type,
                total_shipments = report.summary.total_shipments,
                customers = report.customer_analytics.len(),
                routes = report.top_routes.len(),
                daily_rows = report.daily_shipments.as_ref().map(Vec::len),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Report generated"
            ),
            Err(e) => tracing::error!(
                report_type = %resolved.report_type,
                error = %e,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Report generation failed"
            ),
        }

        outcome
    }

    /// Customers and users available as filter values.
    pub async fn list_filter_options(&self) -> Result<FilterOptions, ReportError> {
        let (customers, users) = tokio::try_join!(
            self.store.list_filter_customers(),
            self.store.list_filter_users(),
        )?;

        Ok(FilterOptions { customers, users })
    }

    async fn run_queries(
        &self,
        resolved: &ResolvedFilter,
        now: DateTime<Utc>,
    ) -> Result<QueryResults, StoreError> {
        let all = async {
            let ((counts, groups, listings), months, daily) = tokio::try_join!(
                self.primary_queries(resolved),
                self.monthly_queries(&resolved.shipments, now),
                self.daily_listing(resolved),
            )?;

            Ok::<_, StoreError>(QueryResults {
                counts,
                groups,
                listings,
                months,
                daily,
            })
        };

        match self.settings.query_timeout {
            Some(limit) => tokio::time::timeout(limit, all)
                .await
                .map_err(|_| StoreError::Timeout(limit))?,
            None => all.await,
        }
    }

    async fn primary_queries(
        &self,
        resolved: &ResolvedFilter,
    ) -> Result<(SummaryCounts, Groupings, Listings), StoreError> {
        let store = &*self.store;
        let shipments = &resolved.shipments;
        let window = &resolved.window;
        let active_filter = shipments.restricted_to(&ShipmentStatus::active_statuses());
        let completed_filter = shipments.restricted_to(&COMPLETED_STATUSES);

        let counts = async {
            let (total, active, completed, customers, documents, users, verified) = tokio::try_join!(
                store.count_shipments(shipments),
                store.count_shipments(&active_filter),
                store.count_shipments(&completed_filter),
                store.count_records(RecordKind::Customers, window),
                store.count_records(RecordKind::Documents, window),
                store.count_records(RecordKind::Users, window),
                store.count_documents_with_status(DocumentStatus::Verified, window),
            )?;

            Ok::<_, StoreError>(SummaryCounts {
                total_shipments: total,
                active_shipments: active,
                completed_shipments: completed,
                customers,
                documents,
                users,
                verified_documents: verified,
            })
        };

        let groups = async {
            let (
                shipment_status,
                shipment_type,
                document_status,
                document_type,
                user_role,
                timeline_status,
                notification_type,
            ) = tokio::try_join!(
                store.group_shipments(ShipmentGroupField::Status, shipments),
                store.group_shipments(ShipmentGroupField::Type, shipments),
                store.group_documents(DocumentGroupField::Status, window),
                store.group_documents(DocumentGroupField::Type, window),
                store.group_users_by_role(window),
                store.group_timeline_events_by_status(window),
                store.group_notifications_by_type(window),
            )?;

            Ok::<_, StoreError>(Groupings {
                shipment_status,
                shipment_type,
                document_status,
                document_type,
                user_role,
                timeline_status,
                notification_type,
            })
        };

        let listings = async {
            let (customers, completed_listing, routes, users) = tokio::try_join!(
                store.list_customers_with_shipments(shipments, self.settings.customer_limit),
                store.list_completed_shipments(&completed_filter),
                store.top_routes(&completed_filter, self.settings.route_limit),
                store.list_users_with_activity(shipments, window, self.settings.user_limit),
            )?;

            Ok::<_, StoreError>(Listings {
                customers,
                completed: completed_listing,
                routes,
                users,
            })
        };

        tokio::try_join!(counts, groups, listings)
    }

    /// Twelve month groups of three counts each, all concurrent.
    async fn monthly_queries(
        &self,
        shipments: &ShipmentScopedFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthCounts>, StoreError> {
        let store = &*self.store;

        try_join_all(trailing_months(now, TREND_MONTHS).into_iter().map(|month| async move {
            let window = DateWindow::between(month.start, month.end);
            let in_month = shipments.created_within(window);
            let completed_in_month = in_month.restricted_to(&COMPLETED_STATUSES);
            let documents_window = GlobalDateWindow(window);

            let (shipment_count, documents, completed) = tokio::try_join!(
                store.count_shipments(&in_month),
                store.count_records(RecordKind::Documents, &documents_window),
                store.count_shipments(&completed_in_month),
            )?;

            Ok::<_, StoreError>(MonthCounts {
                month,
                shipments: shipment_count,
                documents,
                completed,
            })
        }))
        .await
    }

    async fn daily_listing(
        &self,
        resolved: &ResolvedFilter,
    ) -> Result<Option<Vec<ShipmentWithTimeline>>, StoreError> {
        match resolved.scope {
            ReportScope::DailyOperations { .. } => self
                .store
                .list_shipments_with_timeline(&resolved.shipments)
                .await
                .map(Some),
            ReportScope::Standard => Ok(None),
        }
    }
}

/// Merges the joined query results into the final report.
fn assemble(
    resolved: &ResolvedFilter,
    now: DateTime<Utc>,
    route_limit: usize,
    results: QueryResults,
) -> Result<ReportResult, ReportError> {
    let QueryResults {
        counts,
        groups,
        listings,
        months,
        daily,
    } = results;
    let window = resolved.window.window();

    let customer_analytics = calculators::customer_analytics(listings.customers)?;
    let top_routes = calculators::route_analytics(
        &listings.completed,
        listings.routes,
        counts.total_shipments,
        route_limit,
    )?;
    let performance_metrics = calculators::performance_metrics(
        &listings.completed,
        PerformanceCounts {
            total_shipments: counts.total_shipments,
            completed_shipments: counts.completed_shipments,
            total_documents: counts.documents,
            verified_documents: counts.verified_documents,
        },
    )?;

    Ok(ReportResult {
        report_type: resolved.report_type,
        generated_at: now,
        period: ReportPeriod {
            start: window.start,
            end: window.end,
        },
        summary: ReportSummary {
            total_shipments: counts.total_shipments,
            active_shipments: counts.active_shipments,
            completed_shipments: counts.completed_shipments,
            total_customers: counts.customers,
            total_documents: counts.documents,
            total_users: counts.users,
            total_revenue: None,
        },
        shipments_by_status: calculators::distribution(&groups.shipment_status, counts.total_shipments),
        shipments_by_type: calculators::distribution(&groups.shipment_type, counts.total_shipments),
        documents_by_status: calculators::distribution(&groups.document_status, counts.documents),
        documents_by_type: calculators::distribution(&groups.document_type, counts.documents),
        users_by_role: calculators::distribution(&groups.user_role, counts.users),
        customer_analytics,
        monthly_trends: calculators::monthly_trends(months),
        top_routes,
        user_activity: calculators::user_activity(listings.users),
        timeline_analytics: calculators::timeline_analytics(groups.timeline_status),
        performance_metrics,
        notifications_by_type: calculators::self_weighted_distribution(&groups.notification_type),
        daily_shipments: daily.map(extract_daily_rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Customer, Document, DocumentType, Notification, NotificationType, Shipment,
        ShipmentType, TimelineEvent, User, UserRole,
    };
    use crate::services::report_store::InMemoryReportStore;
    use chrono::{Duration as ChronoDuration, NaiveDate, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn customer(name: &str) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("ops@{}.example", name.to_lowercase()),
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    fn user(name: &str, role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role,
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    struct ShipmentSpec<'a> {
        customer: &'a Customer,
        creator: &'a User,
        status: ShipmentStatus,
        created_at: DateTime<Utc>,
        days_open: i64,
        route: (&'a str, &'a str),
    }

    fn shipment(spec: ShipmentSpec<'_>) -> Shipment {
        Shipment {
            id: Uuid::new_v4(),
            reference: format!("SHP-{}", &Uuid::new_v4().simple().to_string()[..6]),
            status: spec.status,
            shipment_type: ShipmentType::Sea,
            customer_id: spec.customer.id,
            created_by: spec.creator.id,
            origin: spec.route.0.to_string(),
            destination: spec.route.1.to_string(),
            container_number: None,
            truck_number: None,
            bill_of_lading: None,
            created_at: spec.created_at,
            updated_at: spec.created_at + ChronoDuration::days(spec.days_open),
            arrival_date: None,
        }
    }

    fn january(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap()
    }

    /// Ten January shipments: four delivered, one empty-returned, five in transit.
    fn january_store() -> (InMemoryReportStore, Customer, User) {
        let acme = customer("Acme");
        let clerk = user("Clerk", UserRole::Operator);
        let mut shipments = Vec::new();
        for i in 0..10u32 {
            let status = match i {
                0..=3 => ShipmentStatus::Delivered,
                4 => ShipmentStatus::EmptyReturned,
                _ => ShipmentStatus::InTransit,
            };
            shipments.push(shipment(ShipmentSpec {
                customer: &acme,
                creator: &clerk,
                status,
                created_at: january(i + 1),
                days_open: 4,
                route: if i % 2 == 0 {
                    ("Dar es Salaam", "Lusaka")
                } else {
                    ("Mombasa", "Kampala")
                },
            }));
        }
        // Outside the January window.
        shipments.push(shipment(ShipmentSpec {
            customer: &acme,
            creator: &clerk,
            status: ShipmentStatus::Delivered,
            created_at: Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap(),
            days_open: 2,
            route: ("Beira", "Harare"),
        }));

        let documents = shipments
            .iter()
            .take(3)
            .enumerate()
            .map(|(i, s)| Document {
                id: Uuid::new_v4(),
                shipment_id: s.id,
                document_type: DocumentType::BillOfLading,
                status: if i == 0 {
                    DocumentStatus::Pending
                } else {
                    DocumentStatus::Verified
                },
                uploaded_by: clerk.id,
                uploaded_at: january(15),
            })
            .collect();

        let store = InMemoryReportStore::new()
            .with_customers(vec![acme.clone()])
            .with_users(vec![clerk.clone()])
            .with_shipments(shipments)
            .with_documents(documents)
            .with_notifications(vec![
                Notification {
                    id: Uuid::new_v4(),
                    notification_type: NotificationType::ShipmentUpdate,
                    timestamp: january(20),
                },
                Notification {
                    id: Uuid::new_v4(),
                    notification_type: NotificationType::System,
                    timestamp: january(21),
                },
            ]);

        (store, acme, clerk)
    }

    fn january_filter() -> ReportFilter {
        ReportFilter::new(crate::models::ReportType::ShipmentsSummary)
            .with_date_range(date(2024, 1, 1), date(2024, 1, 31))
    }

    #[tokio::test]
    async fn test_january_summary() {
        let (store, _, _) = january_store();
        let engine = ReportEngine::new(Arc::new(store));

        let report = engine.generate_report(&january_filter(), now()).await.unwrap();

        assert_eq!(report.summary.total_shipments, 10);
        assert_eq!(report.summary.completed_shipments, 5);
        assert_eq!(report.summary.active_shipments, 5);
        assert_eq!(
            report.shipments_by_status.iter().map(|e| e.count).sum::<i64>(),
            10
        );
        assert_eq!(report.summary.total_documents, 3);
        assert_eq!(report.performance_metrics.document_approval_rate, 67);
        assert_eq!(report.performance_metrics.on_time_delivery_rate, 50);
        assert_eq!(report.performance_metrics.average_delivery_time, 4);
        assert!(report.summary.total_revenue.is_none());
        assert!(report.daily_shipments.is_none());
    }

    #[tokio::test]
    async fn test_distributions_sum_to_hundred() {
        let (store, _, _) = january_store();
        let engine = ReportEngine::new(Arc::new(store));

        let report = engine.generate_report(&january_filter(), now()).await.unwrap();

        for entries in [
            &report.shipments_by_status,
            &report.shipments_by_type,
            &report.documents_by_status,
            &report.documents_by_type,
            &report.users_by_role,
            &report.notifications_by_type,
        ] {
            let sum: i32 = entries.iter().map(|e| e.percentage).sum();
            assert!((98..=102).contains(&sum), "sum was {}", sum);
        }
    }

    #[tokio::test]
    async fn test_monthly_trends_cover_trailing_year() {
        let (store, _, _) = january_store();
        let engine = ReportEngine::new(Arc::new(store));

        let report = engine.generate_report(&january_filter(), now()).await.unwrap();
        let trends = &report.monthly_trends;

        assert_eq!(trends.len(), 12);
        assert_eq!(trends[0].month, "Apr 2023");
        assert_eq!(trends[11].month, "Mar 2024");
        for pair in trends.windows(2) {
            assert!(pair[0].month_start < pair[1].month_start);
        }

        // The month window replaces the caller's January range.
        let january = trends.iter().find(|t| t.month == "Jan 2024").unwrap();
        let february = trends.iter().find(|t| t.month == "Feb 2024").unwrap();
        assert_eq!(january.shipments, 10);
        assert_eq!(january.completion_rate, 50);
        assert_eq!(january.documents, 3);
        assert_eq!(february.shipments, 1);
        assert_eq!(february.completion_rate, 100);
    }

    #[tokio::test]
    async fn test_top_routes_bounded_and_sorted() {
        let (store, _, _) = january_store();
        let engine = ReportEngine::new(Arc::new(store));

        let report = engine.generate_report(&january_filter(), now()).await.unwrap();

        assert!(report.top_routes.len() <= 10);
        for pair in report.top_routes.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
        // Delivered on days 1,3 (Dar) and 2,4 (Mombasa); empty-returned on day 5 (Dar).
        assert_eq!(report.top_routes[0].route, "Dar es Salaam → Lusaka");
        assert_eq!(report.top_routes[0].count, 3);
        assert_eq!(report.top_routes[0].average_delivery_time, 4);
        assert_eq!(report.top_routes[0].percentage, 30);
    }

    #[tokio::test]
    async fn test_customer_with_only_pending_shipments() {
        let acme = customer("Acme");
        let clerk = user("Clerk", UserRole::Operator);
        let shipments = (1..=3)
            .map(|day| {
                shipment(ShipmentSpec {
                    customer: &acme,
                    creator: &clerk,
                    status: ShipmentStatus::InTransit,
                    created_at: january(day),
                    days_open: 9,
                    route: ("Dar es Salaam", "Ndola"),
                })
            })
            .collect();
        let store = InMemoryReportStore::new()
            .with_customers(vec![acme])
            .with_users(vec![clerk])
            .with_shipments(shipments);
        let engine = ReportEngine::new(Arc::new(store));

        let report = engine
            .generate_report(&ReportFilter::new(crate::models::ReportType::CustomerAnalytics), now())
            .await
            .unwrap();

        let analytics = &report.customer_analytics[0];
        assert_eq!(analytics.pending_shipments, 3);
        assert_eq!(analytics.completed_shipments, 0);
        assert_eq!(analytics.average_delivery_time, 0);
        assert!(report.top_routes.is_empty());
    }

    #[tokio::test]
    async fn test_shipment_filters_do_not_apply_to_documents() {
        let (store, _, _) = january_store();
        let engine = ReportEngine::new(Arc::new(store));
        let mut filter = january_filter();
        filter.status = Some(vec![ShipmentStatus::InTransit]);

        let report = engine.generate_report(&filter, now()).await.unwrap();

        assert_eq!(report.summary.total_shipments, 5);
        assert_eq!(report.summary.completed_shipments, 0);
        assert_eq!(report.summary.total_documents, 3);
        assert_eq!(report.summary.total_users, 1);
    }

    #[tokio::test]
    async fn test_user_activity() {
        let (store, _, clerk) = january_store();
        let engine = ReportEngine::new(Arc::new(store));

        let report = engine.generate_report(&january_filter(), now()).await.unwrap();

        assert_eq!(report.user_activity.len(), 1);
        assert_eq!(report.user_activity[0].user_id, clerk.id);
        assert_eq!(report.user_activity[0].shipments_created, 10);
        assert_eq!(report.user_activity[0].documents_uploaded, 3);
        assert_eq!(report.user_activity[0].last_activity, clerk.updated_at);
        assert_eq!(report.users_by_role[0].key, "OPERATOR");
        assert_eq!(report.users_by_role[0].percentage, 100);
    }

    #[tokio::test]
    async fn test_user_activity_limited_to_users_in_window() {
        let (store, _, clerk) = january_store();
        let mut veteran = user("Veteran", UserRole::Admin);
        veteran.created_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let store = store.with_users(vec![clerk.clone(), veteran.clone()]);
        let engine = ReportEngine::new(Arc::new(store));
        let filter = ReportFilter::new(crate::models::ReportType::UserActivity)
            .with_date_range(date(2024, 1, 1), date(2024, 1, 31));

        let report = engine.generate_report(&filter, now()).await.unwrap();

        assert_eq!(report.summary.total_users, 1);
        assert_eq!(report.user_activity.len(), 1);
        assert_eq!(report.user_activity[0].user_id, clerk.id);
        assert!(report
            .user_activity
            .iter()
            .all(|entry| entry.user_id != veteran.id));
    }

    #[tokio::test]
    async fn test_idle_customers_follow_active_ones() {
        let (store, acme, clerk) = january_store();
        let idle = customer("Idle");
        let store = store.with_customers(vec![acme.clone(), idle.clone()]);
        let engine = ReportEngine::new(Arc::new(store));

        let report = engine.generate_report(&january_filter(), now()).await.unwrap();

        assert_eq!(report.customer_analytics.len(), 2);
        assert_eq!(report.customer_analytics[0].customer_id, acme.id);
        assert_eq!(report.customer_analytics[0].total_shipments, 10);
        let quiet = &report.customer_analytics[1];
        assert_eq!(quiet.customer_id, idle.id);
        assert_eq!(quiet.total_shipments, 0);
        assert_eq!(quiet.average_delivery_time, 0);

        let mut filter = january_filter();
        filter.customer_id = Some(acme.id);
        filter.user_id = Some(clerk.id);
        let narrowed = engine.generate_report(&filter, now()).await.unwrap();
        assert_eq!(narrowed.customer_analytics.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_query_times_out_whole_report() {
        let (store, _, _) = january_store();
        let store = store.delaying("list_completed_shipments", Duration::from_secs(120));
        let settings = EngineSettings {
            query_timeout: Some(Duration::from_secs(5)),
            ..EngineSettings::default()
        };
        let engine = ReportEngine::with_settings(Arc::new(store), settings);

        let result = engine.generate_report(&january_filter(), now()).await;

        match result {
            Err(ReportError::Store(StoreError::Timeout(limit))) => {
                assert_eq!(limit, Duration::from_secs(5));
            }
            other => panic!("expected timeout, got {:?}", other.map(|r| r.report_type)),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_query_within_timeout_succeeds() {
        let (store, _, _) = january_store();
        let store = store.delaying("top_routes", Duration::from_secs(2));
        let settings = EngineSettings {
            query_timeout: Some(Duration::from_secs(5)),
            ..EngineSettings::default()
        };
        let engine = ReportEngine::with_settings(Arc::new(store), settings);

        let report = engine.generate_report(&january_filter(), now()).await.unwrap();
        assert_eq!(report.summary.total_shipments, 10);
    }

    #[tokio::test]
    async fn test_idempotent_for_unchanged_store() {
        let (store, _, _) = january_store();
        let engine = ReportEngine::new(Arc::new(store));

        let first = engine.generate_report(&january_filter(), now()).await.unwrap();
        let second = engine.generate_report(&january_filter(), now()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_daily_report_for_empty_day() {
        let (store, _, _) = january_store();
        let engine = ReportEngine::new(Arc::new(store));

        let report = engine
            .generate_report(&ReportFilter::daily(date(2024, 3, 5)), now())
            .await
            .unwrap();

        assert_eq!(report.daily_shipments, Some(vec![]));
        assert_eq!(report.summary.total_shipments, 0);
        assert_eq!(report.summary.total_documents, 0);
        assert_eq!(
            report.period.start,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );
        assert_eq!(
            report.period.end,
            Some(Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_daily_report_rows() {
        let acme = customer("Acme");
        let other = customer("Other");
        let clerk = user("Clerk", UserRole::Operator);
        let day = Utc.with_ymd_and_hms(2024, 3, 5, 7, 0, 0).unwrap();
        let target = shipment(ShipmentSpec {
            customer: &acme,
            creator: &clerk,
            status: ShipmentStatus::Delivered,
            created_at: day,
            days_open: 0,
            route: ("Dar es Salaam", "Lubumbashi"),
        });
        let foreign = shipment(ShipmentSpec {
            customer: &other,
            creator: &clerk,
            status: ShipmentStatus::Created,
            created_at: day,
            days_open: 0,
            route: ("Dar es Salaam", "Lusaka"),
        });
        let events = vec![
            TimelineEvent {
                id: Uuid::new_v4(),
                shipment_id: target.id,
                status: ShipmentStatus::EmptyReturned,
                timestamp: day + ChronoDuration::hours(3),
                location: None,
                notes: None,
            },
            TimelineEvent {
                id: Uuid::new_v4(),
                shipment_id: target.id,
                status: ShipmentStatus::Delivered,
                timestamp: day + ChronoDuration::hours(5),
                location: None,
                notes: None,
            },
        ];
        let store = InMemoryReportStore::new()
            .with_customers(vec![acme.clone(), other])
            .with_users(vec![clerk])
            .with_shipments(vec![target.clone(), foreign])
            .with_timeline_events(events);
        let engine = ReportEngine::new(Arc::new(store));

        let mut filter = ReportFilter::daily(date(2024, 3, 5));
        filter.daily_report_customer_id = Some(acme.id);
        let report = engine.generate_report(&filter, now()).await.unwrap();

        let rows = report.daily_shipments.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shipment_id, target.id);
        assert_eq!(rows[0].customer_name, "Acme");
        assert_eq!(
            rows[0].final_delivery_date,
            Some(day + ChronoDuration::hours(5))
        );
        assert_eq!(report.timeline_analytics.len(), 2);
    }

    #[tokio::test]
    async fn test_single_failing_query_fails_report() {
        let (store, _, _) = january_store();
        let engine = ReportEngine::new(Arc::new(store.failing_on("top_routes")));

        let err = engine.generate_report(&january_filter(), now()).await.unwrap_err();
        assert!(matches!(
            err,
            ReportError::Store(StoreError::Query { query: "top_routes", .. })
        ));
    }

    #[tokio::test]
    async fn test_validation_precedes_queries() {
        let store = Arc::new(InMemoryReportStore::failing());
        let engine = ReportEngine::new(Arc::clone(&store));
        let filter = ReportFilter::new(crate::models::ReportType::ShipmentsSummary)
            .with_date_range(date(2024, 2, 1), date(2024, 1, 1));

        let err = engine.generate_report(&filter, now()).await.unwrap_err();

        assert!(matches!(err, ReportError::Validation(_)));
        assert_eq!(store.query_count(), 0);
    }

    #[tokio::test]
    async fn test_engine_over_trait_object() {
        let store: Arc<dyn ReportStore> = Arc::new(InMemoryReportStore::new());
        let engine = ReportEngine::new(store);

        let report = engine
            .generate_report(&ReportFilter::default(), now())
            .await
            .unwrap();
        assert_eq!(report.monthly_trends.len(), 12);
        assert!(report
            .shipments_by_status
            .iter()
            .all(|entry| entry.percentage == 0));
    }

    #[tokio::test]
    async fn test_filter_options() {
        let (store, acme, clerk) = january_store();
        let engine = ReportEngine::new(Arc::new(store));

        let options = engine.list_filter_options().await.unwrap();
        assert_eq!(options.customers[0].id, acme.id);
        assert_eq!(options.users[0].id, clerk.id);
    }

    #[tokio::test]
    async fn test_filter_options_store_failure() {
        let engine = ReportEngine::new(Arc::new(InMemoryReportStore::failing()));
        assert!(matches!(
            engine.list_filter_options().await,
            Err(ReportError::Store(_))
        ));
    }
}
