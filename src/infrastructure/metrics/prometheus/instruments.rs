use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

pub const REQUEST_DURATION_NAME: &str = "custom_http_request_duration_seconds";
pub const REQUEST_COUNTER_NAME: &str = "custom_total_request_counter";

/// Upper bounds in seconds, ascending. Prometheus adds the `+Inf` overflow
/// bucket itself, and each bound is inclusive (`le`).
pub const REQUEST_DURATION_BUCKETS: [f64; 8] = [0.01, 0.05, 0.1, 0.3, 0.5, 1.0, 3.0, 5.0];

/// Request latency histogram labelled by method, route and status code.
pub fn request_duration() -> prometheus::Result<HistogramVec> {
    // ---
    HistogramVec::new(
        HistogramOpts::new(REQUEST_DURATION_NAME, "Request duration in seconds")
            .buckets(REQUEST_DURATION_BUCKETS.to_vec()),
        &["method", "route", "status_code"],
    )
}

/// Request counter labelled by method and route.
pub fn request_counter() -> prometheus::Result<IntCounterVec> {
    // ---
    IntCounterVec::new(
        Opts::new(REQUEST_COUNTER_NAME, "Total request count"),
        &["method", "route"],
    )
}
