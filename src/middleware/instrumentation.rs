//! Per-request metrics and route logging.
//!
//! `track_requests` wraps the whole downstream call chain. Once the inner
//! service produces a response head it records one counter increment and
//! one histogram observation, then hands the request to the route logger.
//! Handler panics are caught here and turned into the generic 500 envelope
//! so they are still recorded; they are logged once, here, and not by the
//! process panic hook. A request whose future is dropped before a
//! response exists (client went away mid-handler) records nothing.

use crate::domain::{InFlightRequest, MetricsPtr, RequestRecord};
use crate::handlers::AppError;
use crate::infrastructure::logging::{panic_message, within_panic_boundary, RouteLogger};
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Shared state for [`track_requests`].
#[derive(Clone)]
pub struct Instrumentation {
    metrics: MetricsPtr,
    logger: RouteLogger,
    excluded_path: Arc<str>,
}

impl Instrumentation {
    /// `excluded_path` is the scrape endpoint; requests to it are passed
    /// through without touching metrics or logs.
    pub fn new(metrics: MetricsPtr, logger: RouteLogger, excluded_path: &str) -> Self {
        // ---
        Self {
            metrics,
            logger,
            excluded_path: Arc::from(excluded_path),
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        path == &*self.excluded_path
    }

    /// Applies a completed request to the metrics and the route logger.
    ///
    /// Metric failures are logged and swallowed.
    pub fn finalize(&self, record: &RequestRecord) {
        // ---
        if let Err(err) = self.metrics.record_request(&record.method, &record.route) {
            tracing::warn!(
                error = %err,
                method = %record.method,
                route = %record.route,
                "Failed to count request"
            );
        }

        if let Err(err) = self.metrics.observe_duration(
            &record.method,
            &record.route,
            record.status,
            record.elapsed_seconds(),
        ) {
            tracing::warn!(
                error = %err,
                method = %record.method,
                route = %record.route,
                status = record.status,
                "Failed to observe request duration"
            );
        }

        self.logger.request_completed(record);
    }
}

/// Route label for a request: the matched route template when routing
/// succeeded, otherwise the raw path (404s from the fallback).
pub fn route_key(request: &Request) -> String {
    // ---
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned())
}

/// Axum middleware that instruments every request except the scrape path.
pub async fn track_requests(
    State(instrumentation): State<Instrumentation>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    if instrumentation.is_excluded(request.uri().path()) {
        return next.run(request).await;
    }

    let in_flight = InFlightRequest::start(request.method().as_str(), route_key(&request));

    let response = match AssertUnwindSafe(within_panic_boundary(next.run(request)))
        .catch_unwind()
        .await
    {
        Ok(response) => response,
        Err(payload) => {
            instrumentation.logger.error(
                "Handler panicked",
                json!({
                    "route": in_flight.route(),
                    "panic": panic_message(&*payload),
                }),
            );
            AppError::Internal.into_response()
        }
    };

    let record = in_flight.finish(response.status().as_u16());
    instrumentation.finalize(&record);

    response
}
