use prometheus::{Encoder, Registry, TextEncoder};

/// Build a fresh registry, with process metrics where the platform has them.
pub fn new_registry() -> prometheus::Result<Registry> {
    // ---
    let registry = Registry::new();
    register_process_metrics(&registry)?;
    Ok(registry)
}

#[cfg(target_os = "linux")]
fn register_process_metrics(registry: &Registry) -> prometheus::Result<()> {
    // CPU, resident memory, open fds and start time of this process.
    let collector = prometheus::process_collector::ProcessCollector::for_self();
    registry.register(Box::new(collector))
}

#[cfg(not(target_os = "linux"))]
fn register_process_metrics(_registry: &Registry) -> prometheus::Result<()> {
    tracing::debug!("Process metrics unavailable on this platform");
    Ok(())
}

/// Render every family in `registry` in Prometheus text format.
pub fn render_registry(registry: &Registry) -> String {
    // ---
    let families = registry.gather();
    let mut buffer = Vec::new();

    if let Err(err) = TextEncoder::new().encode(&families, &mut buffer) {
        tracing::error!(error = %err, "Failed to encode metrics");
    }

    String::from_utf8(buffer).unwrap_or_else(|err| {
        tracing::error!(error = %err, "Metrics output was not valid UTF-8");
        String::new()
    })
}
