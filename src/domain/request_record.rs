use std::collections::HashSet;
use std::time::{Duration, Instant};

/// A request that has started but not yet produced a response.
///
/// Consumed by [`InFlightRequest::finish`], so a request can be completed
/// at most once.
#[derive(Debug)]
pub struct InFlightRequest {
    method: String,
    route: String,
    started: Instant,
}

impl InFlightRequest {
    pub fn start(method: impl Into<String>, route: impl Into<String>) -> Self {
        // ---
        Self {
            method: method.into(),
            route: route.into(),
            started: Instant::now(),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// Stamp the final status and the time elapsed since `start`.
    pub fn finish(self, status: u16) -> RequestRecord {
        // ---
        RequestRecord {
            elapsed: self.started.elapsed(),
            method: self.method,
            route: self.route,
            status,
        }
    }
}

/// A completed request, handed to metrics and the route logger, then dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub method: String,
    pub route: String,
    pub status: u16,
    pub elapsed: Duration,
}

impl RequestRecord {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Elapsed milliseconds with two decimals, as written to route logs.
    pub fn duration_ms(&self) -> String {
        format!("{:.2}", self.elapsed.as_secs_f64() * 1_000.0)
    }
}

/// Route keys whose requests are logged. Fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitoredRoutes(HashSet<String>);

impl MonitoredRoutes {
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(routes.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, route: &str) -> bool {
        self.0.contains(route)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
