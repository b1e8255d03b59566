//! Cron-style job scheduler using tokio-cron-scheduler.
//!
//! Jobs registered here are guarded: while one run of a job is in flight,
//! an overlapping fire of the same job is skipped instead of run
//! concurrently. Every fire - run or skip - is recorded as a job execution.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use newsroom_core::domain::{JobExecution, JobOutcome};
use newsroom_core::ports::JobExecutionRepository;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Enable scheduler.
    pub enabled: bool,
    /// Cron expression for the weekly digest (sec min hour day month dow).
    pub digest_cron: String,
    /// Cron expression for the job-history purge.
    pub purge_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            digest_cron: "0 0 8 * * Mon".to_string(),
            purge_cron: "0 30 3 * * *".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            digest_cron: std::env::var("DIGEST_CRON").unwrap_or(defaults.digest_cron),
            purge_cron: std::env::var("PURGE_CRON").unwrap_or(defaults.purge_cron),
        }
    }
}

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler.
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    /// Add a cron job with an at-most-one-run guard and execution recording.
    ///
    /// The task returns a short human-readable detail on success and an
    /// error string on failure; both land in the execution record.
    pub async fn add_guarded_cron<F, Fut>(
        &self,
        name: &'static str,
        schedule: &str,
        executions: Arc<dyn JobExecutionRepository>,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = Result<String, String>> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(false));

        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            let running = running.clone();
            let executions = executions.clone();

            Box::pin(async move {
                let started_at = Utc::now();

                if running
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    tracing::warn!(job = name, "Previous run still in flight, skipping");
                    record(
                        &executions,
                        JobExecution::new(name, started_at, JobOutcome::Skipped, None),
                    )
                    .await;
                    return;
                }

                tracing::info!(job = name, "Job started");
                let execution = match task().await {
                    Ok(detail) => {
                        tracing::info!(job = name, detail = %detail, "Job finished");
                        JobExecution::new(name, started_at, JobOutcome::Success, Some(detail))
                    }
                    Err(reason) => {
                        tracing::error!(job = name, reason = %reason, "Job failed");
                        JobExecution::new(name, started_at, JobOutcome::Failed, Some(reason))
                    }
                };
                record(&executions, execution).await;

                running.store(false, Ordering::SeqCst);
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(job = name, schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

/// History is best-effort; a failed write never takes the job down.
async fn record(executions: &Arc<dyn JobExecutionRepository>, execution: JobExecution) {
    if let Err(e) = executions.record(execution).await {
        tracing::error!(error = %e, "Failed to record job execution");
    }
}
