// src/lib.rs
use anyhow::Result;
use axum::{middleware::from_fn_with_state, routing::get, Router};

use handlers::{health_check, metrics_handler, root_handler, slow_handler};
use std::sync::Arc;

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod middleware;

pub use app_state::AppState;
pub use config::*;
pub use handlers::{AppError, ErrorEnvelope};
pub use middleware::{route_key, track_requests, Instrumentation};

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_heavy_task, // ---
    create_noop_metrics,
    create_prom_metrics,
    SimulatedHeavyTask,
};
pub use infrastructure::logging::{
    capture_panics, LogHandle, LogShipper, LokiSink, RouteLogger, ShipperSettings,
};
pub use infrastructure::metrics::prometheus::{
    PrometheusMetrics, REQUEST_COUNTER_NAME, REQUEST_DURATION_BUCKETS, REQUEST_DURATION_NAME,
};

/// A fully wired service: router plus the logging pieces that outlive it.
pub struct App {
    pub router: Router,

    /// Route logger shared with the router, for startup-time hooks.
    pub logger: RouteLogger,

    /// Background Loki shipper; `None` when remote shipping is disabled.
    pub shipper: Option<LogShipper>,
}

impl App {
    /// Drains and stops the log shipper, if there is one.
    pub async fn shutdown_logging(shipper: Option<LogShipper>) {
        // ---
        if let Some(shipper) = shipper {
            shipper.shutdown().await;
        }
    }
}

/// Build the HTTP router around an already-constructed state.
///
/// Every route, including the 404 fallback, runs inside the request
/// instrumentation; the scrape endpoint is skipped by the middleware.
pub fn build_router(state: AppState) -> Router {
    // ---
    let instrumentation = Instrumentation::new(
        Arc::clone(state.metrics()),
        state.logger().clone(),
        state.metrics_path(),
    );
    let metrics_path = state.metrics_path().to_string();

    Router::new()
        .route("/", get(root_handler))
        .route("/slow", get(slow_handler))
        .route("/health", get(health_check))
        .route(&metrics_path, get(metrics_handler))
        .with_state(state)
        .layer(from_fn_with_state(instrumentation, track_requests))
}

/// Wire metrics, route logging and handlers from configuration.
///
/// Must be called from within a tokio runtime: the Loki shipper task is
/// spawned here.
pub fn create_app(config: &AppConfig) -> Result<App> {
    // ---
    let metrics = match config.metrics.backend {
        MetricsBackend::Prometheus => create_prom_metrics()?,
        MetricsBackend::Noop => create_noop_metrics()?,
    };

    let logging = &config.logging;
    if logging.monitored_routes.is_empty() {
        tracing::warn!("AXUM_MONITORED_ROUTES is empty; no per-request route logs will be emitted");
    }

    let (logger, shipper) = match &logging.loki_url {
        Some(url) => {
            let sink = LokiSink::new(url, logging.loki_job.clone(), logging.loki_timeout)?;
            tracing::info!(push_url = %sink.push_url(), "Shipping route logs to Loki");

            let shipper = LogShipper::spawn(Arc::new(sink), logging.shipper);
            let logger = RouteLogger::new(logging.monitored_routes.clone(), shipper.handle());
            (logger, Some(shipper))
        }
        None => {
            tracing::info!("AXUM_LOKI_URL is empty; route logs stay local");
            (RouteLogger::local_only(logging.monitored_routes.clone()), None)
        }
    };

    let state = AppState::new(
        metrics,
        logger.clone(),
        create_heavy_task(),
        &config.metrics.path,
    );

    Ok(App {
        router: build_router(state),
        logger,
        shipper,
    })
}
