use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one scheduled job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobOutcome {
    Success,
    Failed,
    /// The previous run of the same job was still in flight, so this fire
    /// was dropped instead of overlapping it.
    Skipped,
}

impl JobOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobOutcome::Success => "success",
            JobOutcome::Failed => "failed",
            JobOutcome::Skipped => "skipped",
        }
    }
}

impl std::str::FromStr for JobOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(JobOutcome::Success),
            "failed" => Ok(JobOutcome::Failed),
            "skipped" => Ok(JobOutcome::Skipped),
            other => Err(format!("unknown job outcome: {other}")),
        }
    }
}

/// Record of one scheduled job run. Pruned by the purge job once older
/// than the retention window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobExecution {
    pub id: Uuid,
    pub job_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: JobOutcome,
    pub detail: Option<String>,
}

impl JobExecution {
    pub fn new(
        job_name: impl Into<String>,
        started_at: DateTime<Utc>,
        outcome: JobOutcome,
        detail: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_name: job_name.into(),
            started_at,
            finished_at: Utc::now(),
            outcome,
            detail,
        }
    }
}
