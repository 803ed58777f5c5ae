//! HTTP API for murmur.
//!
//! Exposes:
//! - Unreplied-comment queries and reply submission
//! - One-off workflow calls
//! - Scheduler control and status
//! - Runtime workflow configuration

mod error;
mod routes;

pub use error::WebError;
pub use routes::{AppState, create_router};
