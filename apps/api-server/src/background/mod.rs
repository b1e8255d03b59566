//! Background processing - the cron scheduler and the recurring jobs.

mod jobs;
mod scheduler;

pub use scheduler::{Scheduler, SchedulerConfig};

use tokio_cron_scheduler::JobSchedulerError;

use crate::state::AppState;

/// Build the scheduler, register the recurring jobs, and start it.
pub async fn start(
    config: &SchedulerConfig,
    state: &AppState,
) -> Result<Scheduler, JobSchedulerError> {
    let scheduler = Scheduler::new(config.clone()).await?;
    jobs::register_jobs(&scheduler, config, state).await?;
    scheduler.start().await?;
    Ok(scheduler)
}
