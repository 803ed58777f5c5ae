//! Error types for the Bilibili client.

use thiserror::Error;

/// Errors that can occur when interacting with Bilibili.
#[derive(Debug, Error)]
pub enum BilibiliError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a non-zero business code.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Invalid response from server.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
