//! Error types for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use murmur_comments::CommentsError;
use murmur_scheduler::SchedulerError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by handlers.
///
/// Rendered as `{"detail": "..."}` with a matching status code.
#[derive(Debug, Error)]
pub enum WebError {
    /// The comment page could not be fetched.
    #[error(transparent)]
    Comments(#[from] CommentsError),

    /// Scheduler guard or interval validation failed.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("{0}")]
    BadRequest(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Comments(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Scheduler(_) | WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            WebError::Scheduler(SchedulerError::AlreadyRunning).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::BadRequest("bad".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_detail_is_error_message() {
        let err = WebError::Scheduler(SchedulerError::NotRunning);
        assert_eq!(err.to_string(), "scheduler is not running");
    }
}
