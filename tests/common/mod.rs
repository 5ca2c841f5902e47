// Test helpers are intentionally partially used
#![allow(dead_code)]

use anyhow::{bail, Result};
use axum::Router;
use axum_observability::domain::{HeavyTask, LogRecord, LogSink, MonitoredRoutes};
use axum_observability::{
    build_router, AppState, LogShipper, PrometheusMetrics, RouteLogger, ShipperSettings,
};
use reqwest::Client;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

// ============================================================================
// Test doubles
// ============================================================================

/// Heavy task with a scripted outcome.
pub enum ScriptedTask {
    Succeed(Duration),
    Fail(&'static str),
    Panic,
}

#[async_trait::async_trait]
impl HeavyTask for ScriptedTask {
    async fn run(&self) -> Result<Duration> {
        // ---
        match self {
            ScriptedTask::Succeed(elapsed) => Ok(*elapsed),
            ScriptedTask::Fail(reason) => bail!(*reason),
            ScriptedTask::Panic => panic!("heavy task exploded"),
        }
    }
}

/// Log sink that keeps every shipped record in memory.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.message).collect()
    }
}

#[async_trait::async_trait]
impl LogSink for MemorySink {
    async fn push(&self, batch: &[LogRecord]) -> Result<()> {
        self.records.lock().unwrap().extend_from_slice(batch);
        Ok(())
    }
}

// ============================================================================
// Test application
// ============================================================================

/// An isolated application: its own registry, its own log sink.
pub struct TestApp {
    pub router: Router,
    pub metrics: Arc<PrometheusMetrics>,
    pub sink: Arc<MemorySink>,
    pub logger: RouteLogger,
    shipper: LogShipper,
}

impl TestApp {
    pub fn new(task: ScriptedTask) -> Self {
        Self::with_routes(task, MonitoredRoutes::new(["/", "/slow"]))
    }

    pub fn with_routes(task: ScriptedTask, monitored: MonitoredRoutes) -> Self {
        // ---
        let metrics = Arc::new(PrometheusMetrics::new().expect("registry"));
        let sink = Arc::new(MemorySink::default());
        let shipper = LogShipper::spawn(
            sink.clone(),
            ShipperSettings {
                capacity: 256,
                batch_size: 64,
                flush_interval: Duration::from_secs(3600),
            },
        );
        let logger = RouteLogger::new(monitored, shipper.handle());
        let state = AppState::new(metrics.clone(), logger.clone(), Arc::new(task), "/metrics");

        Self {
            router: build_router(state),
            metrics,
            sink,
            logger,
            shipper,
        }
    }

    /// Stops the shipper so every record logged so far is in `sink`.
    pub async fn flush_logs(self) -> Arc<MemorySink> {
        self.shipper.shutdown().await;
        self.sink
    }
}

// ============================================================================
// Exposition parsing
// ============================================================================

/// Value of the sample whose name and label set are exactly as given.
pub fn sample(text: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    // ---
    let rendered: Vec<String> = labels.iter().map(|(k, v)| format!("{k}=\"{v}\"")).collect();
    let prefix = format!("{name}{{{}}} ", rendered.join(","));

    text.lines()
        .find_map(|line| line.strip_prefix(&prefix))
        .and_then(|value| value.trim().parse().ok())
}

pub fn request_count(text: &str, method: &str, route: &str) -> f64 {
    sample(
        text,
        "custom_total_request_counter",
        &[("method", method), ("route", route)],
    )
    .unwrap_or(0.0)
}

pub fn duration_count(text: &str, method: &str, route: &str, status: &str) -> f64 {
    sample(
        text,
        "custom_http_request_duration_seconds_count",
        &[("method", method), ("route", route), ("status_code", status)],
    )
    .unwrap_or(0.0)
}

// ============================================================================
// Real TCP server
// ============================================================================

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new(app: Router) -> Self {
        // --

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}
