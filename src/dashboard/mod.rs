//! Web dashboard for flowlens.
//!
//! Server-rendered HTML for a single workflow's validation report. Upstream
//! failures render as inline alert panels with status 200; only a missing
//! workflow produces a 404.

pub mod views;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::api::AppState;
use crate::page::{load_workflow_page, PageOutcome};

/// Create dashboard routes.
pub fn create_dashboard_routes() -> Router<AppState> {
    Router::new().route(
        "/apps/{app_id}/workflows/{workflow_id}",
        get(serve_workflow_page),
    )
}

async fn serve_workflow_page(
    State(state): State<AppState>,
    Path((app_id, workflow_id)): Path<(String, String)>,
) -> Response {
    let outcome = load_workflow_page(&state.client, &app_id, &workflow_id).await;
    render_outcome(&outcome)
}

/// Render any page outcome as an HTML response.
pub fn render_outcome(outcome: &PageOutcome) -> Response {
    match outcome {
        PageOutcome::Report(report) => Html(views::workflow_page(report).into_string()).into_response(),
        PageOutcome::ListingFailed { app_id } => Html(
            views::alert_page("Error loading workflows", &format!("AppId: {}", app_id))
                .into_string(),
        )
        .into_response(),
        PageOutcome::ValidationFailed { workflow_id } => {
            Html(views::alert_page("Validation failed", workflow_id).into_string()).into_response()
        }
        PageOutcome::NotFound {
            app_id,
            workflow_id,
        } => (
            StatusCode::NOT_FOUND,
            Html(views::not_found_page(app_id, workflow_id).into_string()),
        )
            .into_response(),
    }
}
