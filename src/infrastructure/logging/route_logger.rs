use super::shipper::LogHandle;
use crate::domain::{LogLevel, LogRecord, MonitoredRoutes, RequestRecord};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Leveled, structured logger whose records are shipped to the remote
/// collector.
///
/// Every call is mirrored as a local `tracing` event, so records still reach
/// stdout when remote shipping is disabled or failing. Calls never block and
/// never fail.
#[derive(Clone)]
pub struct RouteLogger {
    monitored: Arc<MonitoredRoutes>,
    remote: Option<LogHandle>,
}

impl RouteLogger {
    pub fn new(monitored: MonitoredRoutes, remote: LogHandle) -> Self {
        // ---
        Self {
            monitored: Arc::new(monitored),
            remote: Some(remote),
        }
    }

    /// Logger that only writes local `tracing` events.
    pub fn local_only(monitored: MonitoredRoutes) -> Self {
        // ---
        Self {
            monitored: Arc::new(monitored),
            remote: None,
        }
    }

    pub fn monitored_routes(&self) -> &MonitoredRoutes {
        &self.monitored
    }

    pub fn info(&self, message: &str, fields: Value) {
        self.emit(LogLevel::Info, message, fields);
    }

    pub fn error(&self, message: &str, fields: Value) {
        self.emit(LogLevel::Error, message, fields);
    }

    /// Emits one `info` record for a completed request on a monitored route.
    ///
    /// Returns whether a record was emitted.
    pub fn request_completed(&self, record: &RequestRecord) -> bool {
        // ---
        if !self.monitored.contains(&record.route) {
            return false;
        }

        self.info(
            &format!("Request to {}", record.route),
            json!({
                "route": record.route,
                "method": record.method,
                "status": record.status,
                "duration": record.duration_ms(),
            }),
        );
        true
    }

    fn emit(&self, level: LogLevel, message: &str, fields: Value) {
        // ---
        let fields = into_object(fields);
        let fields_json = Value::Object(fields.clone());

        match level {
            LogLevel::Info => {
                tracing::info!(target: "route_log", fields = %fields_json, "{message}")
            }
            LogLevel::Error => {
                tracing::error!(target: "route_log", fields = %fields_json, "{message}")
            }
        }

        if let Some(remote) = &self.remote {
            remote.enqueue(LogRecord::now(level, message, fields));
        }
    }
}

fn into_object(fields: Value) -> Map<String, Value> {
    // ---
    match fields {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => Map::from_iter([("value".to_string(), other)]),
    }
}
