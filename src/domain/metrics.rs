use anyhow::Result;
use std::sync::Arc;

/// Abstraction for the request metric registry (one counter, one histogram).
///
/// Implementations must be safe to update from many in-flight requests at
/// once; `render` may run concurrently with updates.
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in the exposition text format.
    fn render(&self) -> String;

    /// Content type matching the output of [`Metrics::render`].
    fn content_type(&self) -> &'static str;

    /// Increment the request counter for `(method, route)`.
    fn record_request(&self, method: &str, route: &str) -> Result<()>;

    /// Observe a request duration for `(method, route, status)`.
    ///
    /// `seconds` must be finite and non-negative; anything else is rejected
    /// and nothing is recorded.
    fn observe_duration(&self, method: &str, route: &str, status: u16, seconds: f64)
        -> Result<()>;
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
