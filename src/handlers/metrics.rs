use crate::app_state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

/// Handler for the metrics scrape endpoint.
///
/// Returns the registry snapshot in exposition text format. Uses the
/// metrics implementation from AppState, which could be either Prometheus
/// or no-op depending on configuration. Requests to this handler are never
/// instrumented.
pub async fn metrics_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    // ---
    let metrics = app_state.metrics();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, metrics.content_type())],
        metrics.render(),
    )
}
