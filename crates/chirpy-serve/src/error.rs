//! API error types and response formatting.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chirpy_core::ChirpError;
use serde::Serialize;

/// API error type that converts to appropriate HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid request parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation not allowed on this platform.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Request body could not be decoded as the expected JSON. The
    /// `Content-Type` header is not consulted.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Internal server error (database, etc.). Only `message` reaches the client.
    #[error("{message}: {source}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    /// Wrap an internal failure with the message shown to the client.
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }
}

impl From<ChirpError> for ApiError {
    fn from(err: ChirpError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// JSON error response body.
#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Self::Decode(err) => {
                tracing::warn!(error = %err, "failed to decode request body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Couldn't decode parameters".to_string(),
                )
            }
            Self::Internal { message, source } => {
                tracing::error!(error = %source, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
