//! Recurring job scheduler for murmur.
//!
//! This crate provides a scheduler that:
//! - Owns at most one recurring job at a time
//! - Runs the job immediately on start, then every interval
//! - Skips a tick while the previous run is still in flight
//! - Never lets a failed run stop the timer

mod error;
mod scheduler;
mod types;

pub use error::SchedulerError;
pub use scheduler::{JobExecutor, Scheduler};
pub use types::{
    Job, MAX_INTERVAL_HOURS, MIN_INTERVAL_HOURS, RunOutcome, RunStats, SchedulerStatus,
};
