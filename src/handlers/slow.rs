use crate::app_state::AppState;
use crate::handlers::shared_types::AppError;
use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
pub struct SlowResponse {
    status: &'static str,
    message: String,
}

/// Handler for `GET /slow`.
///
/// Runs the heavy task and reports how long it took. A failed task is
/// logged at error level and answered with the generic 500 envelope; the
/// failure reason never reaches the client.
#[tracing::instrument(skip(state))]
pub async fn slow_handler(State(state): State<AppState>) -> Result<Json<SlowResponse>, AppError> {
    // ---
    match state.heavy_task().run().await {
        Ok(elapsed) => {
            state
                .logger()
                .info("Heavy task done successfully", json!({}));

            Ok(Json(SlowResponse {
                status: "Success",
                message: format!("Heavy task completed in {}ms", elapsed.as_millis()),
            }))
        }
        Err(err) => {
            state
                .logger()
                .error("Some error in heavy task", json!({ "error": err.to_string() }));

            Err(AppError::Internal)
        }
    }
}
