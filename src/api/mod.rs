//! HTTP API server for flowlens.

mod middleware;

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::client::DashboardClient;
use crate::dashboard::create_dashboard_routes;
use crate::error::{ApiErrorCode, ApiErrorEnvelope};
use crate::insight::{EnvGroup, WorkflowInsight};
use crate::page::{load_workflow_page, PageOutcome, WorkflowReport};
use crate::workflow::Issue;

pub use middleware::{access_log_middleware, request_id_middleware, RequestId, REQUEST_ID_HEADER};

const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Create CORS layer based on environment configuration.
///
/// - FLOWLENS_CORS_ORIGINS: Comma-separated list of allowed origins (default: http://localhost:3000)
/// - FLOWLENS_CORS_ALLOW_ALL: Set to "true" to allow all origins
pub fn create_cors_layer() -> CorsLayer {
    let allow_all = std::env::var("FLOWLENS_CORS_ALLOW_ALL")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    if allow_all {
        warn!("CORS configured to allow all origins");
        return CorsLayer::very_permissive();
    }

    let origins_str =
        std::env::var("FLOWLENS_CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());

    let mut origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(hv) => Some(hv),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if origins.is_empty() {
        warn!("No valid CORS origins configured, using {}", DEFAULT_CORS_ORIGIN);
        origins.push(HeaderValue::from_static(DEFAULT_CORS_ORIGIN));
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Get the maximum concurrent requests limit from environment.
///
/// - FLOWLENS_MAX_CONCURRENT_REQUESTS: Maximum concurrent requests (default: 100)
pub fn get_max_concurrent_requests() -> usize {
    std::env::var("FLOWLENS_MAX_CONCURRENT_REQUESTS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS)
}

/// Create a concurrency limit layer.
pub fn create_concurrency_limit() -> tower::limit::ConcurrencyLimitLayer {
    tower::limit::ConcurrencyLimitLayer::new(get_max_concurrent_requests())
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<DashboardClient>,
}

impl AppState {
    pub fn new(client: DashboardClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

/// Create the JSON API routes (without state applied).
pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/metrics", get(metrics_handler))
        .route("/api/insights/{app_id}/{workflow_id}", get(get_insight))
}

/// Create the complete router: JSON API plus the HTML dashboard.
pub fn create_router(state: AppState) -> Router {
    create_api_routes()
        .merge(create_dashboard_routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(access_log_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(create_concurrency_limit())
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
}

// ============================================================================
// Health & Metrics
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": state.client.base_url(),
    }))
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        crate::metrics::render_metrics(),
    )
}

// ============================================================================
// Insight Endpoint
// ============================================================================

/// JSON body of a successful report.
#[derive(Serialize)]
pub struct InsightResponse<'a> {
    pub app_id: &'a str,
    pub workflow_id: &'a str,
    pub download_url: Option<&'a str>,
    #[serde(flatten)]
    pub insight: &'a WorkflowInsight,
    pub urls_by_env: Vec<EnvGroup<'a>>,
    pub issues: &'a [Issue],
}

impl<'a> InsightResponse<'a> {
    pub fn new(report: &'a WorkflowReport) -> Self {
        Self {
            app_id: &report.app_id,
            workflow_id: &report.workflow_id,
            download_url: report.file.download_url.as_deref(),
            insight: &report.insight,
            urls_by_env: report.insight.urls_by_env(),
            issues: &report.result.issues,
        }
    }
}

async fn get_insight(
    State(state): State<AppState>,
    Path((app_id, workflow_id)): Path<(String, String)>,
    request: Request,
) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());
    let outcome = load_workflow_page(&state.client, &app_id, &workflow_id).await;
    insight_response(&outcome, request_id)
}

/// Render a page outcome as a JSON response.
pub fn insight_response(outcome: &PageOutcome, request_id: Option<String>) -> Response {
    let envelope = match outcome {
        PageOutcome::Report(report) => {
            return Json(InsightResponse::new(report)).into_response();
        }
        PageOutcome::ListingFailed { app_id } => ApiErrorEnvelope::new(
            ApiErrorCode::UpstreamListingFailed,
            "Error loading workflows",
        )
        .with_details(json!({ "app_id": app_id })),
        PageOutcome::ValidationFailed { workflow_id } => ApiErrorEnvelope::new(
            ApiErrorCode::UpstreamValidationFailed,
            "Validation failed",
        )
        .with_details(json!({ "workflow_id": workflow_id })),
        PageOutcome::NotFound {
            app_id,
            workflow_id,
        } => ApiErrorEnvelope::new(
            ApiErrorCode::WorkflowNotFound,
            format!("Workflow '{}' not found", workflow_id),
        )
        .with_details(json!({ "app_id": app_id, "workflow_id": workflow_id })),
    };

    let envelope = match request_id {
        Some(id) => envelope.with_request(id),
        None => envelope,
    };
    let status = StatusCode::from_u16(envelope.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope.to_json())).into_response()
}
