use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::upstream::UpstreamError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned from a route handler. Renders as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map an upstream failure for a client. Transport and decode errors are
    /// logged and replaced by `context`; the cause never leaves the server.
    pub fn upstream(err: UpstreamError, context: &str) -> Self {
        match err {
            UpstreamError::MissingApiKey(_) => {
                error!(error = %err, "{}", context);
                Self::internal(err.to_string())
            }
            UpstreamError::NotFound(message) => Self::not_found(message),
            other => {
                error!(error = %other, "{}", context);
                Self::internal(context)
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_internal_with_reason() {
        let err = ApiError::upstream(UpstreamError::MissingApiKey("OMDb"), "Failed to fetch");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "OMDb API key is not configured");
    }

    #[test]
    fn test_not_found_keeps_upstream_message() {
        let err = ApiError::upstream(
            UpstreamError::NotFound("Movie not found!".to_string()),
            "Failed to fetch",
        );
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Movie not found!");
    }

    #[test]
    fn test_other_errors_are_hidden() {
        let err = ApiError::upstream(
            UpstreamError::Status {
                provider: "TMDB",
                status_code: 401,
                message: "secret detail".to_string(),
            },
            "Failed to fetch popular movies",
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to fetch popular movies");
    }
}
