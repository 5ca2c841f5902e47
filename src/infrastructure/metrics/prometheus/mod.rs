mod instruments;
mod prometheus_metrics;
mod recorder;

pub use prometheus_metrics::PrometheusMetrics;
use std::sync::Arc;

// Instrument names, for callers that inspect rendered output.
pub use instruments::{REQUEST_COUNTER_NAME, REQUEST_DURATION_BUCKETS, REQUEST_DURATION_NAME};

/// Creates a new Prometheus metrics implementation.
///
/// The returned instance owns a private registry holding the request
/// counter, the request duration histogram and (on Linux) process metrics.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");
    Ok(Arc::new(PrometheusMetrics::new()?))
}
