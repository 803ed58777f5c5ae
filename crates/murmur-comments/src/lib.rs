//! Comment reconciliation for murmur.
//!
//! Finds the comments on the creator's content that the creator has not
//! answered yet, and submits replies to them.
//!
//! - [`reconcile`] holds the pure matching algorithm
//! - [`CommentService`] wires it to a [`CommentSource`]

mod error;
pub mod reconcile;
mod service;
mod types;

pub use error::CommentsError;
pub use service::{CommentService, CommentSource, DEFAULT_PAGE_SIZE};
pub use types::{Comment, NO_PARENT, ReplyOutcome, UnrepliedComments};
