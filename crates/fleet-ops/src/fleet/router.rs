use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::notifications::AlertNotifier;
use super::report::ReviewFilter;
use super::service::{FleetService, FleetServiceError};
use crate::fleet::domain::Severity;
use crate::fleet::report;
use crate::store::{Collection, FleetStore};

/// Router builder exposing the generic collection endpoints and the derived
/// alert/report views.
pub fn fleet_router<S, N>(service: Arc<FleetService<S, N>>) -> Router
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    Router::new()
        .route(
            "/api/data/:collection",
            get(collection_handler::<S, N>).post(replace_collection_handler::<S, N>),
        )
        .route("/api/v1/fleet/alerts", get(alerts_handler::<S, N>))
        .route("/api/v1/fleet/dashboard", get(dashboard_handler::<S, N>))
        .route(
            "/api/v1/fleet/reports/technical-review",
            get(technical_review_handler::<S, N>),
        )
        .route(
            "/api/v1/fleet/reports/comparison",
            get(comparison_handler::<S, N>),
        )
        .route("/api/v1/fleet/reports/costs", get(costs_handler::<S, N>))
        .route(
            "/api/v1/fleet/notifications",
            get(notifications_handler::<S, N>),
        )
        .route(
            "/api/v1/fleet/notifications/dispatch",
            post(dispatch_handler::<S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlertsQuery {
    today: Option<NaiveDate>,
    limit: Option<usize>,
    #[serde(default)]
    danger_only: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardQuery {
    today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TechnicalReviewQuery {
    today: Option<NaiveDate>,
    #[serde(default)]
    filter: ReviewFilter,
    #[serde(default)]
    format: ReportFormat,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComparisonQuery {
    from: NaiveDate,
    to: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CostsQuery {
    truck_id: u64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DispatchQuery {
    today: Option<NaiveDate>,
}

async fn collection_handler<S, N>(
    State(service): State<Arc<FleetService<S, N>>>,
    Path(collection): Path<String>,
) -> Response
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    let Some(collection) = Collection::parse(&collection) else {
        return collection_not_found();
    };
    match service.collection_json(collection) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn replace_collection_handler<S, N>(
    State(service): State<Arc<FleetService<S, N>>>,
    Path(collection): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Response
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    let Some(collection) = Collection::parse(&collection) else {
        return collection_not_found();
    };
    match service.replace_collection(collection, payload) {
        Ok(records) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Data saved successfully",
                "records": records,
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

async fn alerts_handler<S, N>(
    State(service): State<Arc<FleetService<S, N>>>,
    Query(query): Query<AlertsQuery>,
) -> Response
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    match service.alerts(today) {
        Ok(alerts) => {
            let mut alerts = alerts;
            if query.danger_only {
                alerts.retain(|alert| alert.severity == Severity::Danger);
            }
            if let Some(limit) = query.limit {
                alerts.truncate(limit);
            }
            (
                StatusCode::OK,
                Json(json!({ "today": today, "alerts": alerts })),
            )
                .into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn dashboard_handler<S, N>(
    State(service): State<Arc<FleetService<S, N>>>,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    match service.dashboard(today) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn technical_review_handler<S, N>(
    State(service): State<Arc<FleetService<S, N>>>,
    Query(query): Query<TechnicalReviewQuery>,
) -> Response
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    let entries = match service.technical_review(today, query.filter) {
        Ok(entries) => entries,
        Err(error) => return error_response(error),
    };

    match query.format {
        ReportFormat::Json => (StatusCode::OK, Json(entries)).into_response(),
        ReportFormat::Csv => match report::technical_review_csv(&entries) {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(error) => error_response(FleetServiceError::Report(error)),
        },
    }
}

async fn comparison_handler<S, N>(
    State(service): State<Arc<FleetService<S, N>>>,
    Query(query): Query<ComparisonQuery>,
) -> Response
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    match service.fleet_comparison(query.from, query.to) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn costs_handler<S, N>(
    State(service): State<Arc<FleetService<S, N>>>,
    Query(query): Query<CostsQuery>,
) -> Response
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    let range = match (query.from, query.to) {
        (Some(from), Some(to)) => Some((from, to)),
        (None, None) => None,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "from and to must be provided together" })),
            )
                .into_response()
        }
    };
    match service.maintenance_costs(query.truck_id, range) {
        Ok(costs) => (
            StatusCode::OK,
            Json(json!({
                "truckId": query.truck_id,
                "costs": costs,
                "total": costs.total(),
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

async fn notifications_handler<S, N>(State(service): State<Arc<FleetService<S, N>>>) -> Response
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    (StatusCode::OK, Json(service.notifications())).into_response()
}

async fn dispatch_handler<S, N>(
    State(service): State<Arc<FleetService<S, N>>>,
    Query(query): Query<DispatchQuery>,
) -> Response
where
    S: FleetStore + 'static,
    N: AlertNotifier + 'static,
{
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    match service.dispatch_notifications(today) {
        Ok(sent) => (StatusCode::OK, Json(json!({ "sent": sent }))).into_response(),
        Err(error) => error_response(error),
    }
}

fn collection_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Collection not found" })),
    )
        .into_response()
}

fn error_response(error: FleetServiceError) -> Response {
    let status = match &error {
        FleetServiceError::InvalidPayload { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}
