//! The workflow report flow shared by every surface.
//!
//! Two sequential upstream calls: list the application's workflow files,
//! then validate the one whose name matches. Failures never escape as
//! errors; each is folded into a [`PageOutcome`] the caller renders.

use tracing::{error, info, warn};

use crate::client::DashboardClient;
use crate::error::Error;
use crate::insight::WorkflowInsight;
use crate::metrics;
use crate::workflow::{ValidationResult, WorkflowFile};

/// A fully loaded report.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub app_id: String,
    pub workflow_id: String,
    pub file: WorkflowFile,
    pub result: ValidationResult,
    pub insight: WorkflowInsight,
}

impl WorkflowReport {
    pub fn new(app_id: &str, file: WorkflowFile, result: ValidationResult) -> Self {
        let insight = WorkflowInsight::from_result(&result);
        Self {
            app_id: app_id.to_string(),
            workflow_id: file.name.clone(),
            file,
            result,
            insight,
        }
    }
}

/// How a report request ended.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Report(Box<WorkflowReport>),
    /// The workflow listing could not be loaded.
    ListingFailed { app_id: String },
    /// The matched workflow could not be validated.
    ValidationFailed { workflow_id: String },
    /// No listed file is named `workflow_id`.
    NotFound { app_id: String, workflow_id: String },
}

impl PageOutcome {
    /// Short label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            PageOutcome::Report(_) => "report",
            PageOutcome::ListingFailed { .. } => "listing_failed",
            PageOutcome::ValidationFailed { .. } => "validation_failed",
            PageOutcome::NotFound { .. } => "not_found",
        }
    }
}

/// Find the file whose name equals `workflow_id` exactly.
pub fn find_workflow_file<'a>(files: &'a [WorkflowFile], workflow_id: &str) -> Option<&'a WorkflowFile> {
    files.iter().find(|f| f.name == workflow_id)
}

/// Load and derive the report for one workflow.
pub async fn load_workflow_page(
    client: &DashboardClient,
    app_id: &str,
    workflow_id: &str,
) -> PageOutcome {
    let outcome = fetch_outcome(client, app_id, workflow_id).await;
    metrics::record_report(outcome.label());
    outcome
}

async fn fetch_outcome(client: &DashboardClient, app_id: &str, workflow_id: &str) -> PageOutcome {
    info!(app_id, workflow_id, "Loading workflow report");

    let files = match client.list_workflow_files(app_id).await {
        Ok(files) => files,
        Err(e) => {
            log_upstream_failure(&e, "Failed to load workflow listing");
            return PageOutcome::ListingFailed {
                app_id: app_id.to_string(),
            };
        }
    };

    let Some(file) = find_workflow_file(&files, workflow_id).cloned() else {
        warn!(app_id, workflow_id, "Workflow not found in listing");
        return PageOutcome::NotFound {
            app_id: app_id.to_string(),
            workflow_id: workflow_id.to_string(),
        };
    };

    let Some(download_url) = file.download_url.clone() else {
        warn!(app_id, workflow_id, "Listed workflow has no download URL");
        return PageOutcome::ValidationFailed {
            workflow_id: workflow_id.to_string(),
        };
    };

    match client.validate(&download_url).await {
        Ok(result) => {
            let report = WorkflowReport::new(app_id, file, result);
            info!(
                app_id,
                workflow_id,
                success = report.insight.success,
                errors = report.insight.error_count,
                warnings = report.insight.warning_count,
                "Workflow report loaded"
            );
            PageOutcome::Report(Box::new(report))
        }
        Err(e) => {
            log_upstream_failure(&e, "Failed to validate workflow");
            PageOutcome::ValidationFailed {
                workflow_id: workflow_id.to_string(),
            }
        }
    }
}

/// Non-success statuses are expected outcomes; transport and decode
/// failures are not.
fn log_upstream_failure(e: &Error, message: &str) {
    match e {
        Error::Upstream { .. } => warn!(code = e.code(), "{}: {}", message, e),
        _ => error!(code = e.code(), "{}: {}", message, e),
    }
}
