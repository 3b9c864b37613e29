//! Logging and optional OpenTelemetry tracing.
//!
//! Logs always go to stderr through a `tracing-subscriber` fmt layer,
//! filtered by `RUST_LOG` (default `flowlens=info`). OpenTelemetry export is
//! opt-in.
//!
//! # Environment Variables
//!
//! - `FLOWLENS_OTEL_ENABLED`: Set to "true" to enable OpenTelemetry (default: false)
//! - `FLOWLENS_OTEL_ENDPOINT`: OTLP endpoint URL (default: http://localhost:4317)
//! - `FLOWLENS_OTEL_SERVICE_NAME`: Service name for traces (default: flowlens)
//! - `FLOWLENS_OTEL_SAMPLE_RATE`: Sampling rate 0.0-1.0 (default: 1.0)

use opentelemetry::trace::TracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider as SdkTracerProvider},
    Resource,
};
use tracing::{info, Subscriber};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "flowlens=info";

/// Configuration for OpenTelemetry.
#[derive(Debug, Clone)]
pub struct OtelConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub service_name: String,
    /// Sampling rate (0.0 to 1.0).
    pub sample_rate: f64,
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:4317".to_string(),
            service_name: "flowlens".to_string(),
            sample_rate: 1.0,
        }
    }
}

impl OtelConfig {
    /// Read `FLOWLENS_OTEL_*` variables over the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("FLOWLENS_OTEL_ENABLED")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(defaults.enabled),
            endpoint: std::env::var("FLOWLENS_OTEL_ENDPOINT").unwrap_or(defaults.endpoint),
            service_name: std::env::var("FLOWLENS_OTEL_SERVICE_NAME")
                .unwrap_or(defaults.service_name),
            sample_rate: std::env::var("FLOWLENS_OTEL_SAMPLE_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sample_rate),
        }
    }

    /// Sampler for the configured rate, clamping out-of-range values.
    pub fn sampler(&self) -> Sampler {
        if self.sample_rate >= 1.0 {
            Sampler::AlwaysOn
        } else if self.sample_rate <= 0.0 {
            Sampler::AlwaysOff
        } else {
            Sampler::TraceIdRatioBased(self.sample_rate)
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Human-readable log lines on stderr, so stdout stays free for reports.
fn fmt_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter())
}

/// Initialize logging, plus OpenTelemetry export when enabled.
///
/// Returns the tracer provider so the caller can flush it on shutdown.
pub fn init_telemetry(
    config: &OtelConfig,
) -> Result<Option<SdkTracerProvider>, Box<dyn std::error::Error + Send + Sync>> {
    if !config.enabled {
        tracing_subscriber::registry().with(fmt_layer()).try_init()?;
        return Ok(None);
    }

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .build()?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(config.sampler())
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new(vec![
            KeyValue::new("service.name", config.service_name.clone()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]))
        .build();

    let tracer = provider.tracer("flowlens");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(fmt_layer())
        .try_init()?;

    info!(
        endpoint = %config.endpoint,
        service_name = %config.service_name,
        sample_rate = config.sample_rate,
        "OpenTelemetry tracing initialized"
    );

    Ok(Some(provider))
}

/// Flush and shut down OpenTelemetry tracing.
pub fn shutdown_telemetry(provider: Option<SdkTracerProvider>) {
    if let Some(provider) = provider {
        if let Err(e) = provider.shutdown() {
            tracing::error!("Failed to shutdown OpenTelemetry provider: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OtelConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.endpoint, "http://localhost:4317");
        assert_eq!(config.service_name, "flowlens");
        assert_eq!(config.sample_rate, 1.0);
    }

    #[test]
    fn test_sampler_bounds() {
        let config = OtelConfig {
            sample_rate: 1.5,
            ..OtelConfig::default()
        };
        assert!(matches!(config.sampler(), Sampler::AlwaysOn));

        let config = OtelConfig {
            sample_rate: -0.5,
            ..OtelConfig::default()
        };
        assert!(matches!(config.sampler(), Sampler::AlwaysOff));

        let config = OtelConfig {
            sample_rate: 0.25,
            ..OtelConfig::default()
        };
        assert!(matches!(config.sampler(), Sampler::TraceIdRatioBased(r) if r == 0.25));
    }
}
