//! Scheduled job bodies: the weekly digest and the job-history purge.
//!
//! The cron mechanism lives with the server; these are the callable bodies
//! it invokes. At-most-one-run-per-job is the scheduler wrapper's contract.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::DomainError;
use crate::ports::{JobExecutionRepository, PostRepository};
use crate::services::notification::NotificationDispatcher;

/// How far the digest looks back, and how long job-execution rows are kept.
pub const JOB_HISTORY_RETENTION_DAYS: i64 = 7;

const DIGEST_LOOKBACK_DAYS: i64 = 7;

/// What one digest run did.
#[derive(Debug, Default)]
pub struct DigestSummary {
    pub posts: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Re-sends post notifications for everything published in the trailing week.
pub struct DigestService {
    posts: Arc<dyn PostRepository>,
    notifier: Arc<NotificationDispatcher>,
}

impl DigestService {
    pub fn new(posts: Arc<dyn PostRepository>, notifier: Arc<NotificationDispatcher>) -> Self {
        Self { posts, notifier }
    }

    /// Fan out every post created in the last 7 days. A post whose fan-out
    /// errors is skipped and counted; the rest of the digest still goes out.
    pub async fn send_weekly_digest(&self, now: DateTime<Utc>) -> Result<DigestSummary, DomainError> {
        let since = now - TimeDelta::days(DIGEST_LOOKBACK_DAYS);
        let posts = self.posts.created_since(since).await?;

        let mut summary = DigestSummary {
            posts: posts.len(),
            ..Default::default()
        };

        for post in &posts {
            match self.notifier.notify_post_published(post).await {
                Ok(report) => {
                    summary.sent += report.sent;
                    summary.failed += report.failures.len();
                }
                Err(e) => {
                    tracing::error!(post_id = %post.id, error = %e, "Digest fan-out failed for post");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            posts = summary.posts,
            sent = summary.sent,
            failed = summary.failed,
            "Weekly digest finished"
        );
        Ok(summary)
    }
}

/// Prunes old job-execution records.
pub struct JobHistoryService {
    executions: Arc<dyn JobExecutionRepository>,
}

impl JobHistoryService {
    pub fn new(executions: Arc<dyn JobExecutionRepository>) -> Self {
        Self { executions }
    }

    /// Delete execution rows older than the retention window. Returns how
    /// many rows were removed.
    pub async fn purge(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let cutoff = now - TimeDelta::days(JOB_HISTORY_RETENTION_DAYS);
        let purged = self.executions.delete_older_than(cutoff).await?;
        tracing::info!(purged, "Purged old job executions");
        Ok(purged)
    }
}
