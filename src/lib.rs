//! flowlens - workflow validation insights
//!
//! flowlens looks up one workflow file registered for an application,
//! asks the dashboard API to validate it, and turns the validation report
//! into something a human can scan: status badges, issue details, and the
//! metadata extracted from the workflow document.
//!
//! ## Surfaces
//!
//! - **HTML page**: `GET /apps/{app_id}/workflows/{workflow_id}`
//! - **JSON report**: `GET /api/insights/{app_id}/{workflow_id}`
//! - **Terminal report**: `flowlens report <APP_ID> <WORKFLOW_ID>`
//!
//! All three run the same [`page::load_workflow_page`] flow and differ only
//! in how the resulting [`page::PageOutcome`] is rendered.
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use flowlens::client::DashboardClient;
//! use flowlens::page::{load_workflow_page, PageOutcome};
//!
//! # async fn run() -> flowlens::Result<()> {
//! let client = DashboardClient::new("http://localhost:3000", Duration::from_secs(30))?;
//! match load_workflow_page(&client, "app-42", "onboarding.json").await {
//!     PageOutcome::Report(report) => {
//!         println!("{} errors", report.insight.error_count);
//!     }
//!     other => println!("{}", other.label()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod insight;
pub mod metrics;
pub mod page;
pub mod report;
pub mod telemetry;
pub mod workflow;

pub use error::{Error, Result};
