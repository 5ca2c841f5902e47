//! Prometheus metrics implementation.
//!
//! This module provides a concrete implementation of the `Metrics` trait on
//! top of the `prometheus` crate. Each `PrometheusMetrics` owns its own
//! `Registry`, so several independent instances can live in one process
//! (tests rely on this). The instruments are atomics internally; updates
//! from concurrent requests never lose increments.

use super::instruments;
use super::recorder::{new_registry, render_registry};
use crate::domain::Metrics;
use anyhow::{ensure, Result};
use prometheus::{HistogramVec, IntCounterVec, Registry};

/// Prometheus-backed request metrics.
pub struct PrometheusMetrics {
    registry: Registry,
    request_duration: HistogramVec,
    request_counter: IntCounterVec,
}

impl PrometheusMetrics {
    /// Creates the registry and registers both request instruments.
    ///
    /// # Errors
    /// Returns an error if an instrument cannot be built or registered.
    pub fn new() -> Result<Self> {
        // ---
        tracing::info!("Creating Prometheus metrics");

        let registry = new_registry()?;
        let request_duration = instruments::request_duration()?;
        let request_counter = instruments::request_counter()?;

        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(request_counter.clone()))?;

        Ok(Self {
            registry,
            request_duration,
            request_counter,
        })
    }
}

impl Metrics for PrometheusMetrics {
    // ---
    fn render(&self) -> String {
        render_registry(&self.registry)
    }

    fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    fn record_request(&self, method: &str, route: &str) -> Result<()> {
        // ---
        self.request_counter
            .get_metric_with_label_values(&[method, route])?
            .inc();
        Ok(())
    }

    fn observe_duration(&self, method: &str, route: &str, status: u16, seconds: f64) -> Result<()> {
        // ---
        ensure!(
            seconds.is_finite() && seconds >= 0.0,
            "invalid request duration: {seconds}"
        );

        let status = status.to_string();
        self.request_duration
            .get_metric_with_label_values(&[method, route, status.as_str()])?
            .observe(seconds);
        Ok(())
    }
}
