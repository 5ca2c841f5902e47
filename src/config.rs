// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Everything is read once at startup and is immutable afterwards; values
//! that cannot be parsed are treated as deployment errors rather than
//! recoverable runtime conditions.

use crate::domain::MonitoredRoutes;
use crate::infrastructure::logging::ShipperSettings;
use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

/// Reads an optional environment variable that must parse when present.
///
/// A missing variable yields the default; a present but malformed value
/// fails startup with a clear message naming the variable.
macro_rules! strict_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        match std::env::var($key) {
            Ok(v) => v.trim().parse::<$ty>().map_err(|_| {
                anyhow::anyhow!(concat!("Invalid configuration: ", $key, "={}"), v)
            })?,
            Err(_) => $default,
        }
    };
}

/// Reads an optional string environment variable with a default.
macro_rules! optional_env {
    // ---
    ($key:literal, $default:expr) => {
        std::env::var($key).unwrap_or_else(|_| $default.to_string())
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to an invalid
/// environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_invalid_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Invalid configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: server::ServerConfig,
    pub metrics: metrics::MetricsConfig,
    pub logging: logging::LoggingConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any configuration value is present but invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            server: server::ServerConfig::from_env()?,
            metrics: metrics::MetricsConfig::from_env()?,
            logging: logging::LoggingConfig::from_env()?,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// Listener configuration.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Interface to bind. Defaults to `0.0.0.0`.
        pub host: String,

        /// TCP port to listen on. Defaults to 8000.
        pub port: u16,
    }

    impl ServerConfig {
        /// Builds a [`ServerConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `PORT` is set but is not a valid port number.
        pub fn from_env() -> Result<Self> {
            // ---
            let host = optional_env!("AXUM_BIND_HOST", "0.0.0.0");
            let port = strict_env_parse!("PORT", u16, 8000);

            Ok(Self { host, port })
        }

        pub fn bind_addr(&self) -> String {
            format!("{}:{}", self.host, self.port)
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Metrics configuration
// ============================================================

mod metrics {
    // ---
    use super::*;

    /// Which metrics backend to use.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MetricsBackend {
        Prometheus,
        Noop,
    }

    /// Metric registry and request instrumentation settings.
    #[derive(Debug, Clone)]
    pub struct MetricsConfig {
        /// Backend selected by `AXUM_METRICS_TYPE` (`prom` or `noop`).
        pub backend: MetricsBackend,

        /// Scrape endpoint path; never instrumented itself.
        pub path: String,
    }

    impl MetricsConfig {
        /// Builds a [`MetricsConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error for an unknown backend, or a path that is not
        /// absolute, contains a route template, or collides with another
        /// route.
        pub fn from_env() -> Result<Self> {
            // ---
            let backend = match optional_env!("AXUM_METRICS_TYPE", "prom").as_str() {
                "prom" => MetricsBackend::Prometheus,
                "noop" => MetricsBackend::Noop,
                other => anyhow::bail!("Invalid configuration: AXUM_METRICS_TYPE={other}"),
            };

            let path = optional_env!("AXUM_METRICS_PATH", "/metrics");
            if !is_valid_metrics_path(&path) {
                anyhow::bail!("Invalid configuration: AXUM_METRICS_PATH={path}");
            }

            Ok(Self { backend, path })
        }
    }

    /// Paths the router already serves; the scrape endpoint cannot share one.
    const APPLICATION_ROUTES: [&str; 3] = ["/", "/slow", "/health"];

    /// The scrape path must be a literal absolute path that no other route
    /// uses. Template segments would never equal the raw request path.
    fn is_valid_metrics_path(path: &str) -> bool {
        // ---
        path.starts_with('/')
            && !path.contains(['{', '}'])
            && !APPLICATION_ROUTES.contains(&path)
    }
}
pub use metrics::{MetricsBackend, MetricsConfig};

// ============================================================
// Logging configuration
// ============================================================

mod logging {
    // ---
    use super::*;

    /// Route logging and Loki shipping settings.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Loki base URL. `None` keeps route logs local only.
        pub loki_url: Option<String>,

        /// Value of the `job` stream label.
        pub loki_job: String,

        /// Per-push HTTP timeout. Defaults to 5 seconds.
        pub loki_timeout: Duration,

        /// Route keys whose requests are logged.
        pub monitored_routes: MonitoredRoutes,

        /// Queue and batching parameters for the shipper.
        pub shipper: ShipperSettings,
    }

    impl LoggingConfig {
        /// Builds a [`LoggingConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `AXUM_LOKI_URL` is not an http(s) URL.
        pub fn from_env() -> Result<Self> {
            // ---
            let loki_url = match optional_env!("AXUM_LOKI_URL", "http://127.0.0.1:3100") {
                url if url.trim().is_empty() => None,
                url if url.starts_with("http://") || url.starts_with("https://") => Some(url),
                url => anyhow::bail!("Invalid configuration: AXUM_LOKI_URL={url}"),
            };

            let loki_job = optional_env!("AXUM_LOKI_JOB", "axum-observability");
            let timeout_ms = optional_env_parse!("AXUM_LOKI_TIMEOUT_MS", u64, 5_000);

            let monitored_routes = parse_route_list(&optional_env!("AXUM_MONITORED_ROUTES", "/,/slow"));

            let defaults = ShipperSettings::default();
            let shipper = ShipperSettings {
                capacity: optional_env_parse!("AXUM_LOG_QUEUE_CAPACITY", usize, defaults.capacity),
                batch_size: optional_env_parse!("AXUM_LOG_BATCH_SIZE", usize, defaults.batch_size),
                flush_interval: Duration::from_millis(optional_env_parse!(
                    "AXUM_LOG_FLUSH_INTERVAL_MS",
                    u64,
                    1_000
                )),
            };

            Ok(Self {
                loki_url,
                loki_job,
                loki_timeout: Duration::from_millis(timeout_ms),
                monitored_routes,
                shipper,
            })
        }
    }

    /// Splits a comma-separated route list, ignoring blanks.
    pub fn parse_route_list(raw: &str) -> MonitoredRoutes {
        MonitoredRoutes::new(
            raw.split(',')
                .map(str::trim)
                .filter(|route| !route.is_empty()),
        )
    }
}
pub use logging::LoggingConfig;

// ============================================================
// Tests
// ============================================================
