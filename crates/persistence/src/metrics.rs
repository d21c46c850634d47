//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::{Duration, Instant};

/// Histogram of report query latency, labelled by query name.
pub const QUERY_DURATION_METRIC: &str = "report_query_duration_seconds";

/// Queries slower than this are logged at warn.
pub const SLOW_QUERY_THRESHOLD: Duration = Duration::from_secs(2);

/// Record the duration of one report query.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!(QUERY_DURATION_METRIC, "query" => query_name).record(duration_secs);
}

/// Record connection pool gauges.
///
/// Called on every metrics scrape so the gauges reflect the pool at scrape time.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times a query and records it on [`QueryTimer::record`].
///
/// ```ignore
/// let timer = QueryTimer::new("count_shipments");
/// let result = sqlx::query_scalar::<_, i64>(...).fetch_one(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        let elapsed = self.start.elapsed();
        if elapsed >= SLOW_QUERY_THRESHOLD {
            tracing::warn!(
                query = self.query_name,
                elapsed_ms = elapsed.as_millis() as u64,
                "Slow report query"
            );
        }
        record_query_duration(self.query_name, elapsed.as_secs_f64());
    }

    /// Records the duration, then hands `result` back unchanged.
    pub fn observe<T, E>(self, result: Result<T, E>) -> Result<T, E> {
        self.record();
        result
    }
}
