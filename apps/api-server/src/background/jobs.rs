//! The recurring jobs: weekly digest and job-history purge.

use chrono::Utc;
use tokio_cron_scheduler::JobSchedulerError;

use crate::state::AppState;

use super::scheduler::{Scheduler, SchedulerConfig};

pub async fn register_jobs(
    scheduler: &Scheduler,
    config: &SchedulerConfig,
    state: &AppState,
) -> Result<(), JobSchedulerError> {
    let digest = state.digest.clone();
    scheduler
        .add_guarded_cron(
            "weekly_digest",
            &config.digest_cron,
            state.executions.clone(),
            move || {
                let digest = digest.clone();
                async move {
                    digest
                        .send_weekly_digest(Utc::now())
                        .await
                        .map(|s| format!("posts={} sent={} failed={}", s.posts, s.sent, s.failed))
                        .map_err(|e| e.to_string())
                }
            },
        )
        .await?;

    let history = state.history.clone();
    scheduler
        .add_guarded_cron(
            "purge_job_history",
            &config.purge_cron,
            state.executions.clone(),
            move || {
                let history = history.clone();
                async move {
                    history
                        .purge(Utc::now())
                        .await
                        .map(|purged| format!("purged={purged}"))
                        .map_err(|e| e.to_string())
                }
            },
        )
        .await?;

    Ok(())
}
