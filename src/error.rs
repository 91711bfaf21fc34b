use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Message returned to callers when the failure detail must stay internal
pub const SERVICE_UNAVAILABLE: &str = "Service unavailable";

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// No response was received from a remote peer
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote peer answered but signalled a failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Required input was missing or malformed
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The upstream call did not finish in time
    #[error("Upstream timed out after {0}s")]
    Timeout(u64),

    #[error("Trending store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Upstream(format!("Malformed response body: {}", err))
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", err))
    }
}

impl AppError {
    /// HTTP status this error maps to when it reaches the relay boundary
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Transport(_) | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message that is safe to hand to an end user
    ///
    /// Only validation messages are passed through; everything else collapses
    /// to a generic line so provider payloads never reach the view.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Timeout(_) => "The assistant took too long to respond".to_string(),
            _ => SERVICE_UNAVAILABLE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let body = Json(json!({
            "error": self.public_message()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
