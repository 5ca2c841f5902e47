use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Body returned for every server-side failure. Stable; carries no detail.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub status: &'static str,
    pub error: &'static str,
}

impl ErrorEnvelope {
    pub const INTERNAL: ErrorEnvelope = ErrorEnvelope {
        status: "Error",
        error: "Internal Server Error",
    };
}

/// Client-visible handler failures.
#[derive(Debug)]
pub enum AppError {
    /// Anything that went wrong inside a handler. Details are logged
    /// server-side only.
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        match self {
            AppError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorEnvelope::INTERNAL)).into_response()
            }
        }
    }
}
