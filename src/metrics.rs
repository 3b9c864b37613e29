//! Prometheus metrics for flowlens.
//!
//! Exposed via the `/api/metrics` endpoint.
//!
//! ## Metrics
//!
//! ### Counters
//! - `flowlens_reports_total` - Report requests by outcome
//! - `flowlens_upstream_requests_total` - Upstream calls by stage and status
//!
//! ### Histograms
//! - `flowlens_upstream_duration_seconds` - Upstream call duration by stage

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::warn;

use crate::client::UpstreamStage;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Safe to call more than once; later calls return the same handle.
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                warn!("A global metrics recorder is already installed");
            }
            handle
        })
        .clone()
}

/// Get the Prometheus handle, if metrics have been initialized.
pub fn get_prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Render current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    match get_prometheus_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

/// Record one report request and how it ended.
pub fn record_report(outcome: &str) {
    counter!(
        "flowlens_reports_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record an upstream response.
pub fn record_upstream_request(stage: UpstreamStage, status_code: u16) {
    counter!(
        "flowlens_upstream_requests_total",
        "stage" => stage.as_str(),
        "status" => status_code.to_string()
    )
    .increment(1);
}

/// Record upstream call duration, including failed calls.
pub fn record_upstream_duration(duration: Duration, stage: UpstreamStage) {
    histogram!(
        "flowlens_upstream_duration_seconds",
        "stage" => stage.as_str()
    )
    .record(duration.as_secs_f64());
}
