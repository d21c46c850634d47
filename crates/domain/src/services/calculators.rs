//! Stateless metric calculators.
//!
//! Each calculator takes owned query results and returns a finished report
//! section. None of them touches the store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::calendar::{days_between, MonthWindow};
use shared::ratio::{percentage, rounded_mean};

use crate::error::ReportError;
use crate::models::{
    CompletedShipment, CustomerAnalytics, CustomerShipments, DistributionEntry, GroupCount,
    MonthlyTrend, PerformanceMetrics, RouteAnalytics, RouteCount, TimelineAnalytics,
    UserActivity, UserActivityRow,
};

/// Days between creation and last update of a completed shipment.
fn delivery_days(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Result<f64, ReportError> {
    if updated_at < created_at {
        return Err(ReportError::Computation(format!(
            "updatedAt {} precedes createdAt {}",
            updated_at.to_rfc3339(),
            created_at.to_rfc3339()
        )));
    }

    Ok(days_between(created_at, updated_at))
}

/// Formats the display key of an origin/destination pair.
pub fn route_key(origin: &str, destination: &str) -> String {
    format!("{} → {}", origin, destination)
}

// ============================================================================
// Distribution
// ============================================================================

/// Converts group counts into distribution entries, preserving the store's order.
pub fn distribution(groups: &[GroupCount], total: i64) -> Vec<DistributionEntry> {
    groups
        .iter()
        .map(|group| DistributionEntry {
            key: group.key.clone(),
            count: group.count,
            percentage: percentage(group.count, total),
        })
        .collect()
}

/// Distribution whose total is the sum of its own groups.
pub fn self_weighted_distribution(groups: &[GroupCount]) -> Vec<DistributionEntry> {
    let total = groups.iter().map(|g| g.count).sum();
    distribution(groups, total)
}

// ============================================================================
// Customer Analytics
// ============================================================================

/// Per-customer statistics, in the order the store ranked the customers.
pub fn customer_analytics(
    customers: Vec<CustomerShipments>,
) -> Result<Vec<CustomerAnalytics>, ReportError> {
    customers
        .into_iter()
        .map(|customer| {
            let mut completed = 0i64;
            let mut total_days = 0.0;
            for shipment in customer.shipments.iter().filter(|s| s.status.is_completed()) {
                completed += 1;
                total_days += delivery_days(shipment.created_at, shipment.updated_at)?;
            }

            let total = customer.shipments.len() as i64;

            Ok(CustomerAnalytics {
                customer_id: customer.customer_id,
                customer_name: customer.customer_name,
                total_shipments: total,
                completed_shipments: completed,
                pending_shipments: total - completed,
                average_delivery_time: rounded_mean(total_days, completed as usize),
                total_documents: customer.shipments.iter().map(|s| s.document_count).sum(),
            })
        })
        .collect()
}

// ============================================================================
// Monthly Trends
// ============================================================================

/// Raw counts for one month of the trend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCounts {
    pub month: MonthWindow,
    pub shipments: i64,
    pub documents: i64,
    pub completed: i64,
}

pub fn monthly_trends(months: Vec<MonthCounts>) -> Vec<MonthlyTrend> {
    months
        .into_iter()
        .map(|m| MonthlyTrend {
            completion_rate: percentage(m.completed, m.shipments),
            month: m.month.label,
            month_start: m.month.start,
            shipments: m.shipments,
            documents: m.documents,
        })
        .collect()
}

// ============================================================================
// Route Analytics
// ============================================================================

/// Joins the top route counts with delivery times accumulated from the
/// completed-shipment listing.
///
/// A route missing from the listing gets an average of 0. The two inputs come
/// from separate statements and may disagree under concurrent writes.
pub fn route_analytics(
    completed: &[CompletedShipment],
    routes: Vec<RouteCount>,
    total_shipments: i64,
    limit: usize,
) -> Result<Vec<RouteAnalytics>, ReportError> {
    let mut accumulated: HashMap<String, (f64, usize)> = HashMap::new();
    for shipment in completed {
        let days = delivery_days(shipment.created_at, shipment.updated_at)?;
        let entry = accumulated
            .entry(route_key(&shipment.origin, &shipment.destination))
            .or_insert((0.0, 0));
        entry.0 += days;
        entry.1 += 1;
    }

    let mut routes = routes;
    routes.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.origin.cmp(&b.origin))
            .then_with(|| a.destination.cmp(&b.destination))
    });
    routes.truncate(limit);

    Ok(routes
        .into_iter()
        .map(|route| {
            let key = route_key(&route.origin, &route.destination);
            let average_delivery_time = accumulated
                .get(&key)
                .map(|(days, count)| rounded_mean(*days, *count))
                .unwrap_or(0);

            RouteAnalytics {
                route: key,
                percentage: percentage(route.count, total_shipments),
                count: route.count,
                average_delivery_time,
                origin: route.origin,
                destination: route.destination,
            }
        })
        .collect())
}

// ============================================================================
// User Activity
// ============================================================================

pub fn user_activity(rows: Vec<UserActivityRow>) -> Vec<UserActivity> {
    rows.into_iter()
        .map(|row| UserActivity {
            user_id: row.user_id,
            user_name: row.name,
            role: row.role,
            shipments_created: row.shipment_count,
            documents_uploaded: row.document_count,
            last_activity: row.updated_at,
        })
        .collect()
}

// ============================================================================
// Timeline Analytics
// ============================================================================

/// Transition counts per status. Time in status is not measured yet.
pub fn timeline_analytics(groups: Vec<GroupCount>) -> Vec<TimelineAnalytics> {
    groups
        .into_iter()
        .map(|group| TimelineAnalytics {
            status: group.key,
            total_transitions: group.count,
            average_time_in_status: None,
        })
        .collect()
}

// ============================================================================
// Performance Metrics
// ============================================================================

/// Inputs to [`performance_metrics`] that come from count queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceCounts {
    pub total_shipments: i64,
    pub completed_shipments: i64,
    pub total_documents: i64,
    pub verified_documents: i64,
}

pub fn performance_metrics(
    completed: &[CompletedShipment],
    counts: PerformanceCounts,
) -> Result<PerformanceMetrics, ReportError> {
    let total_days = completed
        .iter()
        .map(|s| delivery_days(s.created_at, s.updated_at))
        .sum::<Result<f64, _>>()?;

    Ok(PerformanceMetrics {
        average_delivery_time: rounded_mean(total_days, completed.len()),
        on_time_delivery_rate: percentage(counts.completed_shipments, counts.total_shipments),
        document_approval_rate: percentage(counts.verified_documents, counts.total_documents),
        customer_satisfaction_score: None,
    })
}
