//! Job scheduler implementation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{Job, RunOutcome, RunStats, SchedulerError, SchedulerStatus};

/// Type alias for the job executor function.
pub type JobExecutor =
    Arc<dyn Fn(Job) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send>> + Send + Sync>;

/// The job scheduler.
///
/// Holds at most one recurring job. State transitions are serialized by an
/// internal mutex, so concurrent `start`/`stop` calls are safe.
pub struct Scheduler {
    executor: JobExecutor,
    active: Mutex<Option<ActiveJob>>,
    stats: Arc<RwLock<RunStats>>,
}

/// A started job and the handles needed to stop it.
struct ActiveJob {
    job: Job,
    next_run: Arc<RwLock<Option<DateTime<Utc>>>>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Create a new idle scheduler.
    pub fn new(executor: JobExecutor) -> Self {
        Self {
            executor,
            active: Mutex::new(None),
            stats: Arc::new(RwLock::new(RunStats::default())),
        }
    }

    /// Start the recurring job.
    ///
    /// The first run is dispatched before this returns, even if a run from an
    /// earlier start is still in flight. Later runs follow every
    /// `interval_hours`.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self, interval_hours: u32) -> Result<Job, SchedulerError> {
        let job = Job::every_hours(interval_hours)?;

        let mut active = self.active.lock().await;
        if let Some(existing) = active.as_ref() {
            warn!(name = %existing.job.name, "scheduler is already running");
            return Err(SchedulerError::AlreadyRunning);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Skip-if-busy is scoped to one start
        let runner = Runner {
            job: job.clone(),
            executor: Arc::clone(&self.executor),
            stats: Arc::clone(&self.stats),
            busy: Arc::new(AtomicBool::new(false)),
        };

        let started_at = Utc::now();
        let first_tick = Instant::now() + job.period();
        runner.fire().await;
        let next_run = Arc::new(RwLock::new(Some(job.next_run_after(started_at))));

        let handle = tokio::spawn(run_loop(
            runner,
            first_tick,
            Arc::clone(&next_run),
            shutdown_rx,
        ));

        info!(name = %job.name, interval_hours, "scheduler started");

        *active = Some(ActiveJob {
            job: job.clone(),
            next_run,
            shutdown_tx,
            handle,
        });

        Ok(job)
    }

    /// Stop the recurring job.
    ///
    /// Future ticks are cancelled; a run already in flight completes.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        let mut active = self.active.lock().await;
        let Some(job) = active.take() else {
            warn!("scheduler is not running");
            return Err(SchedulerError::NotRunning);
        };

        let _ = job.shutdown_tx.send(true);
        if let Err(e) = job.handle.await {
            warn!(error = %e, "scheduler loop ended abnormally");
        }

        info!(name = %job.job.name, "scheduler stopped");
        Ok(())
    }

    /// Stop the job if one is running. Used on process exit.
    pub async fn shutdown(&self) {
        match self.stop().await {
            Ok(()) => info!("scheduler shut down"),
            Err(SchedulerError::NotRunning) => debug!("scheduler idle at shutdown"),
            Err(e) => warn!(error = %e, "failed to shut down scheduler"),
        }
    }

    /// Whether a job is scheduled.
    pub async fn is_running(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Get the scheduled job, if any.
    pub async fn job(&self) -> Option<Job> {
        self.active.lock().await.as_ref().map(|a| a.job.clone())
    }

    /// Lifetime run counters.
    pub async fn stats(&self) -> RunStats {
        self.stats.read().await.clone()
    }

    /// Snapshot of the scheduler state.
    pub async fn status(&self) -> SchedulerStatus {
        let stats = self.stats().await;
        let active = self.active.lock().await;

        match active.as_ref() {
            Some(a) => SchedulerStatus {
                running: true,
                job_name: Some(a.job.name.clone()),
                interval_hours: Some(a.job.interval_hours),
                next_run_time: *a.next_run.read().await,
                last_run_time: stats.last_run,
                last_outcome: stats.last_outcome,
                run_count: stats.run_count,
                failure_count: stats.failure_count,
                skipped_count: stats.skipped_count,
                message: "scheduler is running".to_string(),
            },
            None => SchedulerStatus {
                running: false,
                job_name: None,
                interval_hours: None,
                next_run_time: None,
                last_run_time: stats.last_run,
                last_outcome: stats.last_outcome,
                run_count: stats.run_count,
                failure_count: stats.failure_count,
                skipped_count: stats.skipped_count,
                message: "scheduler is not running".to_string(),
            },
        }
    }
}

/// Dispatches runs of one job.
struct Runner {
    job: Job,
    executor: JobExecutor,
    stats: Arc<RwLock<RunStats>>,
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag even if the executor panics.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Runner {
    /// Dispatch one run unless the previous one is still in flight.
    ///
    /// Returns the handle of the spawned run, or `None` if the tick was skipped.
    async fn fire(&self) -> Option<JoinHandle<()>> {
        if self.busy.swap(true, Ordering::AcqRel) {
            warn!(name = %self.job.name, "previous run still in flight, skipping tick");
            self.stats.write().await.skipped_count += 1;
            return None;
        }

        let guard = BusyGuard(Arc::clone(&self.busy));
        let job = self.job.clone();
        let executor = Arc::clone(&self.executor);
        let stats = Arc::clone(&self.stats);

        Some(tokio::spawn(async move {
            let _guard = guard;
            let start = std::time::Instant::now();
            info!(name = %job.name, "executing scheduled job");

            let result = executor(job.clone()).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            let mut stats = stats.write().await;
            stats.last_run = Some(Utc::now());
            stats.run_count += 1;

            match result {
                Ok(()) => {
                    info!(name = %job.name, elapsed_ms, "scheduled job succeeded");
                    stats.last_outcome = Some(RunOutcome::Succeeded);
                }
                Err(error) => {
                    stats.failure_count += 1;
                    warn!(
                        name = %job.name,
                        elapsed_ms,
                        failure_count = stats.failure_count,
                        error = %error,
                        "scheduled job failed, timer keeps running"
                    );
                    stats.last_outcome = Some(RunOutcome::Failed { error });
                }
            }
        }))
    }
}

/// Tick until shutdown, starting at `first_tick`. The run at start time is
/// dispatched by `start` itself.
async fn run_loop(
    runner: Runner,
    first_tick: Instant,
    next_run: Arc<RwLock<Option<DateTime<Utc>>>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(first_tick, runner.job.period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }

            _ = ticker.tick() => {
                let fired_at = Utc::now();
                *next_run.write().await = Some(runner.job.next_run_after(fired_at));
                runner.fire().await;
            }
        }
    }

    debug!(name = %runner.job.name, "scheduler loop exited");
}
