//! Scheduler types.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::SchedulerError;

/// Shortest accepted interval.
pub const MIN_INTERVAL_HOURS: u32 = 1;

/// Longest accepted interval.
pub const MAX_INTERVAL_HOURS: u32 = 24;

/// The recurring job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Human-readable name for the job.
    pub name: String,
    /// Hours between runs.
    pub interval_hours: u32,
    /// When the job was started.
    pub created_at: DateTime<Utc>,
}

/// How the most recent run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded,
    Failed { error: String },
}

/// Counters kept across the scheduler's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// When the last run finished.
    pub last_run: Option<DateTime<Utc>>,
    pub last_outcome: Option<RunOutcome>,
    /// Finished runs, successful or not.
    pub run_count: u64,
    pub failure_count: u64,
    /// Ticks dropped because the previous run was still in flight.
    pub skipped_count: u64,
}

/// Snapshot returned by status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run_time: Option<DateTime<Utc>>,
    pub last_run_time: Option<DateTime<Utc>>,
    pub last_outcome: Option<RunOutcome>,
    pub run_count: u64,
    pub failure_count: u64,
    pub skipped_count: u64,
    pub message: String,
}

impl Job {
    /// Create a job that runs every `interval_hours`.
    pub fn every_hours(interval_hours: u32) -> Result<Self, SchedulerError> {
        if !(MIN_INTERVAL_HOURS..=MAX_INTERVAL_HOURS).contains(&interval_hours) {
            return Err(SchedulerError::InvalidInterval(interval_hours));
        }

        let unit = if interval_hours == 1 { "hour" } else { "hours" };
        Ok(Self {
            name: format!("workflow every {} {}", interval_hours, unit),
            interval_hours,
            created_at: Utc::now(),
        })
    }

    /// Interval as a timer period.
    pub fn period(&self) -> StdDuration {
        StdDuration::from_secs(u64::from(self.interval_hours) * 3600)
    }

    /// When the job fires next if it fired at `last`.
    pub fn next_run_after(&self, last: DateTime<Utc>) -> DateTime<Utc> {
        last + Duration::hours(i64::from(self.interval_hours))
    }
}
