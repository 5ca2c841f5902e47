//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers via the `State` extractor. The `AppState` holds the
//! metric registry, the route logger and the heavy task implementation.
//!
//! The state is designed to be cheaply cloneable (using `Arc` internally
//! where needed) so it can be passed efficiently to each request handler
//! without expensive copying of resources.

use crate::domain::{HeavyTaskPtr, MetricsPtr};
use crate::infrastructure::logging::RouteLogger;
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// This struct serves as the Dependency Injection container for the
/// application. Nothing in it is global: a test can build as many isolated
/// states (each with its own registry) as it likes.
///
/// # Lifecycle
///
/// 1. Created once in `create_app()` during application startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Handlers extract via `State(state): State<AppState>`
#[derive(Clone)]
pub struct AppState {
    /// Metric registry for request counts and durations.
    ///
    /// Either Prometheus-backed (production) or no-op.
    metrics: MetricsPtr,

    /// Structured logger shipping to the remote collector.
    logger: RouteLogger,

    /// Business operation behind `/slow`.
    heavy_task: HeavyTaskPtr,

    /// Path the scrape endpoint is mounted at.
    metrics_path: Arc<str>,
}

impl AppState {
    // ---

    pub fn new(
        metrics: MetricsPtr,
        logger: RouteLogger,
        heavy_task: HeavyTaskPtr,
        metrics_path: &str,
    ) -> Self {
        // ---
        AppState {
            metrics,
            logger,
            heavy_task,
            metrics_path: Arc::from(metrics_path),
        }
    }

    /// Get a reference to the metrics implementation.
    pub fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// Get a reference to the route logger.
    pub fn logger(&self) -> &RouteLogger {
        // ---
        &self.logger
    }

    /// Get a reference to the heavy task implementation.
    pub fn heavy_task(&self) -> &HeavyTaskPtr {
        // ---
        &self.heavy_task
    }

    /// Path of the metrics scrape endpoint.
    pub fn metrics_path(&self) -> &str {
        // ---
        &self.metrics_path
    }
}
