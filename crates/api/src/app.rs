use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::services::{ReportEngine, ReportStore};
use persistence::repositories::ReportRepository;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{health, reports};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub engine: ReportEngine<dyn ReportStore>,
}

/// Builds the router backed by the PostgreSQL report repository.
pub fn create_app(config: Config, pool: PgPool) -> Router {
    let store: Arc<dyn ReportStore> = Arc::new(ReportRepository::new(pool.clone()));
    create_app_with_store(config, pool, store)
}

/// Builds the router over any report store. The pool still backs health checks.
pub fn create_app_with_store(config: Config, pool: PgPool, store: Arc<dyn ReportStore>) -> Router {
    let config = Arc::new(config);
    let engine = ReportEngine::with_settings(store, config.engine_settings());

    let state = AppState {
        pool,
        config: config.clone(),
        engine,
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let report_routes = Router::new()
        .route("/api/v1/reports", post(reports::generate_report))
        .route(
            "/api/v1/reports/filter-options",
            get(reports::get_filter_options),
        )
        .route(
            "/api/v1/reports/daily/export",
            post(reports::export_daily_report),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(report_routes)
        // Bottom layers run first.
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
