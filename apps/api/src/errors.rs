use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Generic message returned for every internal fault. The cause is logged, never sent.
pub const INTERNAL_ERROR_MESSAGE: &str = "Server error – please try again later.";

/// Generic message for an upstream that answered without usable content.
pub const EMPTY_UPSTREAM_MESSAGE: &str = "The model is overloaded or returned nothing.";

/// Failure taxonomy surfaced to callers of the simplification pipeline.
/// `MethodNotAllowed` never comes out of the pipeline itself, only the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    UpstreamUnavailable,
    UpstreamRejected,
    Internal,
    MethodNotAllowed,
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream rejected request: {0}")]
    UpstreamRejected(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::MethodNotAllowed => ErrorKind::MethodNotAllowed,
            AppError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            AppError::UpstreamRejected(_) => ErrorKind::UpstreamRejected,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The message a caller is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg)
            | AppError::UpstreamUnavailable(msg)
            | AppError::UpstreamRejected(msg) => msg.clone(),
            AppError::MethodNotAllowed => "Only POST requests allowed".to_string(),
            AppError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) if e.is_timeout() => AppError::UpstreamUnavailable(
                "The model took too long to respond, please try again.".to_string(),
            ),
            LlmError::Http(_) => AppError::UpstreamUnavailable(
                "The model could not be reached, please try again.".to_string(),
            ),
            LlmError::Unparseable { snippet } => {
                AppError::UpstreamUnavailable(format!("Could not parse response: {snippet}..."))
            }
            LlmError::Api { message, .. } => AppError::UpstreamRejected(
                message.unwrap_or_else(|| EMPTY_UPSTREAM_MESSAGE.to_string()),
            ),
            LlmError::EmptyContent => {
                AppError::UpstreamRejected(EMPTY_UPSTREAM_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.kind() {
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamUnavailable => {
                tracing::warn!("{self}");
                StatusCode::BAD_GATEWAY
            }
            ErrorKind::UpstreamRejected => {
                tracing::warn!("{self}");
                StatusCode::SERVICE_UNAVAILABLE
            }
            ErrorKind::Internal => {
                tracing::error!("Internal error: {self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.public_message() }));

        (status, body).into_response()
    }
}
