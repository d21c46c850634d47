//! Report routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::info;

use domain::models::{FilterOptions, ReportFilter, ReportResult, ReportType};
use domain::ReportError;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_report_generated;
use crate::services::daily_rows_to_csv;

/// Unwraps the request body, reporting malformed JSON as a validation error.
fn parse_filter(body: Result<Json<ReportFilter>, JsonRejection>) -> Result<ReportFilter, ApiError> {
    body.map(|Json(filter)| filter)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

async fn generate(state: &AppState, filter: &ReportFilter) -> Result<ReportResult, ApiError> {
    let result = state.engine.generate_report(filter, Utc::now()).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(ReportError::Validation(_)) => "invalid",
        Err(_) => "failure",
    };
    record_report_generated(filter.report_type, outcome);

    result.map_err(ApiError::from)
}

/// POST /api/v1/reports
///
/// Generate a consolidated report for the submitted filter.
pub async fn generate_report(
    State(state): State<AppState>,
    body: Result<Json<ReportFilter>, JsonRejection>,
) -> Result<Json<ReportResult>, ApiError> {
    let filter = parse_filter(body)?;
    let report = generate(&state, &filter).await?;
    Ok(Json(report))
}

/// GET /api/v1/reports/filter-options
pub async fn get_filter_options(
    State(state): State<AppState>,
) -> Result<Json<FilterOptions>, ApiError> {
    let options = state.engine.list_filter_options().await?;

    info!(
        customers = options.customers.len(),
        users = options.users.len(),
        "Fetched report filter options"
    );

    Ok(Json(options))
}

/// POST /api/v1/reports/daily/export
///
/// Daily operations rows as CSV. Only the daily report kind can be exported.
pub async fn export_daily_report(
    State(state): State<AppState>,
    body: Result<Json<ReportFilter>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = parse_filter(body)?;
    if !filter.report_type.is_daily() {
        return Err(ApiError::Validation(format!(
            "Only {} can be exported as CSV",
            ReportType::DailyShipmentReport
        )));
    }

    let report = generate(&state, &filter).await?;
    let rows = report.daily_shipments.unwrap_or_default();
    let date = filter
        .daily_report_date
        .unwrap_or_else(|| report.generated_at.date_naive());

    info!(rows = rows.len(), date = %date, "Exported daily shipment report");

    let disposition = format!("attachment; filename=\"daily-shipments-{}.csv\"", date);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        daily_rows_to_csv(&rows),
    ))
}
