//! Error types for comment reconciliation.

use thiserror::Error;

/// Errors that can occur while reconciling comments.
#[derive(Debug, Error)]
pub enum CommentsError {
    /// The comment source failed or returned a malformed page.
    #[error("failed to fetch comments: {0}")]
    RemoteFetch(#[source] murmur_bilibili::BilibiliError),
}
