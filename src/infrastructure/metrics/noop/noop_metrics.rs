use crate::domain::Metrics;
use anyhow::Result;

/// No-op metrics implementation for testing or when metrics are disabled.
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn content_type(&self) -> &'static str {
        "text/plain; version=0.0.4; charset=utf-8"
    }
    fn record_request(&self, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
    fn observe_duration(&self, _: &str, _: &str, _: u16, _: f64) -> Result<()> {
        Ok(())
    }
}
