//! Publishing commands.
//!
//! Publishing is an explicit command - policy check, persist, notify - not a
//! side effect of a generic save. Editing is a separate command that never
//! re-notifies subscribers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, PostKind};
use crate::error::DomainError;
use crate::ports::{AuthorRepository, BaseRepository, PostRepository};
use crate::services::notification::NotificationDispatcher;
use crate::services::policy::PublicationPolicy;

/// Input to the publish command.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub author_id: Uuid,
    pub kind: PostKind,
    pub title: String,
    pub content: String,
    pub category_ids: Vec<Uuid>,
}

/// Fields an edit may change. Kind and creation time are immutable.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_ids: Option<Vec<Uuid>>,
}

pub struct PublishingService {
    posts: Arc<dyn PostRepository>,
    authors: Arc<dyn AuthorRepository>,
    policy: PublicationPolicy,
    notifier: Arc<NotificationDispatcher>,
}

impl PublishingService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        authors: Arc<dyn AuthorRepository>,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        let policy = PublicationPolicy::new(Arc::clone(&posts));
        Self {
            posts,
            authors,
            policy,
            notifier,
        }
    }

    /// Publish a new post: quota check, persist, attach categories, fan out.
    ///
    /// The quota check runs before anything is written, so a `QuotaExceeded`
    /// leaves no post row and sends nothing. Once the post is durable,
    /// delivery failures are logged and never unwind the write.
    pub async fn publish(&self, draft: PostDraft, now: DateTime<Utc>) -> Result<Post, DomainError> {
        validate_body(&draft.title, &draft.content)?;

        let author = self
            .authors
            .find_by_id(draft.author_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Author", draft.author_id))?;

        self.policy.assert_can_publish(author.id, now).await?;

        let post = Post::new(author.id, draft.kind, draft.title, draft.content);
        let post = self.posts.save(post).await?;
        self.posts.set_categories(post.id, &draft.category_ids).await?;

        match self.notifier.notify_post_published(&post).await {
            Ok(report) if !report.all_delivered() => {
                tracing::warn!(
                    post_id = %post.id,
                    failed = report.failures.len(),
                    "Some subscribers were not notified"
                );
            }
            Ok(_) => {}
            Err(e) => {
                // The post is already durable; a broken fan-out is reported,
                // not rolled back.
                tracing::error!(post_id = %post.id, error = %e, "Notification fan-out failed");
            }
        }

        Ok(post)
    }

    /// Edit an existing post. Never notifies subscribers.
    pub async fn edit(&self, post_id: Uuid, changes: PostChanges) -> Result<Post, DomainError> {
        let mut post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        validate_body(&post.title, &post.content)?;
        post.updated_at = Utc::now();

        let post = self.posts.save(post).await?;
        if let Some(category_ids) = changes.category_ids {
            self.posts.set_categories(post.id, &category_ids).await?;
        }
        Ok(post)
    }

    pub async fn delete(&self, post_id: Uuid) -> Result<(), DomainError> {
        self.posts.delete(post_id).await.map_err(|e| match e {
            crate::error::RepoError::NotFound => DomainError::not_found("Post", post_id),
            other => other.into(),
        })
    }

    /// The post's owning author, for ownership checks at the web layer.
    pub async fn owner_of(&self, post_id: Uuid) -> Result<Uuid, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;
        Ok(post.author_id)
    }
}

fn validate_body(title: &str, content: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("title must not be empty".into()));
    }
    if content.trim().is_empty() {
        return Err(DomainError::Validation("content must not be empty".into()));
    }
    Ok(())
}
