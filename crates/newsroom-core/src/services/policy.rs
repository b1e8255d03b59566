//! Publication policy - the rolling 24-hour post quota.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::error::DomainError;
use crate::ports::PostRepository;

/// Maximum posts one author may publish inside the quota window.
pub const DAILY_POST_LIMIT: u64 = 3;

/// Enforces the per-author daily post quota before a post is persisted.
pub struct PublicationPolicy {
    posts: Arc<dyn PostRepository>,
}

impl PublicationPolicy {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Check the rolling 24-hour window ending at `now`. Exactly 3 existing
    /// posts inside the window block the 4th; 2 permit a 3rd. Must run before
    /// the new post row is committed so a failed check leaves no state behind.
    pub async fn assert_can_publish(
        &self,
        author_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let since = now - TimeDelta::hours(24);
        let posted = self.posts.count_by_author_since(author_id, since).await?;

        if posted >= DAILY_POST_LIMIT {
            tracing::info!(
                author_id = %author_id,
                posted,
                limit = DAILY_POST_LIMIT,
                "Publication blocked by daily quota"
            );
            return Err(DomainError::QuotaExceeded {
                posted,
                limit: DAILY_POST_LIMIT,
            });
        }

        Ok(())
    }
}
