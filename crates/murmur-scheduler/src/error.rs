//! Error types for the scheduler.

use thiserror::Error;

use crate::{MAX_INTERVAL_HOURS, MIN_INTERVAL_HOURS};

/// Errors that can occur in scheduler operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// A job is already scheduled.
    #[error("scheduler is already running")]
    AlreadyRunning,

    /// No job is scheduled.
    #[error("scheduler is not running")]
    NotRunning,

    /// Interval outside the accepted range.
    #[error(
        "invalid interval: {0} hours (expected {min}-{max})",
        min = MIN_INTERVAL_HOURS,
        max = MAX_INTERVAL_HOURS
    )]
    InvalidInterval(u32),
}
