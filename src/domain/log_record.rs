use anyhow::Result;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Severity of a shipped log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured log line bound for the remote collector.
///
/// Fields stay a JSON object so the collector can index them; they are never
/// folded into `message`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    pub fields: Map<String, Value>,
    /// Unix time of emission in nanoseconds.
    pub timestamp_ns: i64,
}

impl LogRecord {
    /// Stamps the record with the current wall-clock time.
    pub fn now(level: LogLevel, message: impl Into<String>, fields: Map<String, Value>) -> Self {
        // ---
        let now = chrono::Utc::now();
        // Out of range only after the year 2262.
        let timestamp_ns = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000));

        Self {
            level,
            message: message.into(),
            fields,
            timestamp_ns,
        }
    }

    /// JSON line sent to the collector: message and level plus the fields,
    /// flattened into one object.
    pub fn to_json_line(&self) -> String {
        // ---
        let mut line = Map::with_capacity(self.fields.len() + 2);
        line.insert("message".into(), Value::String(self.message.clone()));
        line.insert("level".into(), Value::String(self.level.as_str().into()));
        for (key, value) in &self.fields {
            // Reserved keys win over caller fields.
            line.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Value::Object(line).to_string()
    }
}

/// Destination for batches of log records (Loki in production).
#[async_trait::async_trait]
pub trait LogSink: Send + Sync {
    // ---
    /// Deliver one batch. Errors are reported by the caller, never retried.
    async fn push(&self, batch: &[LogRecord]) -> Result<()>;
}

/// Type alias for any implementation of LogSink.
pub type LogSinkPtr = Arc<dyn LogSink>;

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn json_line_flattens_fields() {
        // ---
        let fields = json!({"route": "/", "status": 200})
            .as_object()
            .cloned()
            .unwrap();
        let record = LogRecord::now(LogLevel::Info, "Request to /", fields);

        let line: Value = serde_json::from_str(&record.to_json_line()).unwrap();
        assert_eq!(line["message"], "Request to /");
        assert_eq!(line["level"], "info");
        assert_eq!(line["route"], "/");
        assert_eq!(line["status"], 200);
    }

    #[test]
    fn reserved_keys_are_not_overwritten() {
        // ---
        let fields = json!({"level": "debug", "message": "spoofed"})
            .as_object()
            .cloned()
            .unwrap();
        let record = LogRecord::now(LogLevel::Error, "real", fields);

        let line: Value = serde_json::from_str(&record.to_json_line()).unwrap();
        assert_eq!(line["message"], "real");
        assert_eq!(line["level"], "error");
    }

    #[test]
    fn timestamp_is_emission_time() {
        // ---
        let before = chrono::Utc::now().timestamp_nanos_opt().unwrap();
        let record = LogRecord::now(LogLevel::Info, "tick", Map::new());
        let after = chrono::Utc::now().timestamp_nanos_opt().unwrap();

        assert!(record.timestamp_ns >= before && record.timestamp_ns <= after);
    }
}
