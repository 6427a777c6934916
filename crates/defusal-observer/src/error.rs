//! Error types for the HTTP layer.
//!
//! [`ObserverError`] converts into an Axum response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//! Malformed queries and unknown paths are not errors here; they are
//! answered normally with empty values.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use defusal_core::QueueError;

/// Errors that can occur while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The command queue is bounded and currently full.
    #[error("{0}")]
    QueueFull(#[from] QueueError),
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::QueueFull(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
