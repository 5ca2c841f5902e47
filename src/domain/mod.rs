mod heavy_task;
mod log_record;
mod metrics;
mod request_record;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Per-request data handed from the middleware to metrics and logging
pub use request_record::{InFlightRequest, MonitoredRoutes, RequestRecord};

// Publicly expose the business task and log shipping abstractions
pub use heavy_task::{HeavyTask, HeavyTaskPtr};
pub use log_record::{LogLevel, LogRecord, LogSink, LogSinkPtr};
