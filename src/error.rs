use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::trivia::TriviaError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested room or player was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Operation cannot be performed in the current game state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The external trivia API did not answer in time.
    #[error("trivia API timed out")]
    UpstreamTimeout,
    /// The external trivia API failed or returned an unusable body.
    #[error("trivia API error: {0}")]
    Upstream(String),
    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TriviaError> for ServiceError {
    fn from(err: TriviaError) -> Self {
        match err {
            TriviaError::Timeout => ServiceError::UpstreamTimeout,
            TriviaError::NoResults => {
                ServiceError::NotFound("no questions matched the requested filters".into())
            }
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input or a rejected game operation.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Upstream trivia API failure.
    #[error("bad gateway: {0}")]
    BadGateway(String),
    /// Upstream trivia API timeout.
    #[error("gateway timeout: {0}")]
    GatewayTimeout(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            // Conflicts (already started, already answered, stale question id)
            // surface as 400 so polling clients treat them as plain rejections.
            ServiceError::Conflict(message) => AppError::BadRequest(message),
            ServiceError::UpstreamTimeout => {
                AppError::GatewayTimeout("trivia API timed out".into())
            }
            ServiceError::Upstream(message) => AppError::BadGateway(message),
            ServiceError::Internal(message) => AppError::Internal(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
