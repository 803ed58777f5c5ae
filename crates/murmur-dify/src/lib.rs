//! Dify workflow client for murmur.
//!
//! A single blocking-mode call to a workflow's `/workflows/run` endpoint.
//! The call never returns an error: every failure is folded into a
//! [`WorkflowCallResult`] so it can run unattended from the scheduler.

mod client;
mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, WORKFLOW_USER, WorkflowClient};
pub use types::{WorkflowCallResult, WorkflowRequest};
