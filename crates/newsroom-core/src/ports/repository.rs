use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Author, Category, Comment, JobExecution, Post, PostFilter, PostKind, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Author repository. One author row per user.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError>;

    /// Persist a freshly recomputed rating onto the author row.
    async fn set_rating(&self, author_id: Uuid, rating: i64) -> Result<(), RepoError>;
}

/// Category repository, including the subscriber membership.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;

    /// All users subscribed to the category.
    async fn subscribers(&self, category_id: Uuid) -> Result<Vec<User>, RepoError>;

    /// Add a subscriber. Inserting an existing membership is a no-op.
    async fn add_subscriber(&self, category_id: Uuid, user_id: Uuid) -> Result<(), RepoError>;

    async fn is_subscriber(&self, category_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;
}

/// Post repository. Carries the explicit query contract the rating formula,
/// quota check, and search are built on - aggregate sums and filtered counts
/// are repository vocabulary, not ORM magic at call sites.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Number of the author's posts with `created_at >= since`. Backs the
    /// rolling 24-hour publication quota.
    async fn count_by_author_since(
        &self,
        author_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, RepoError>;

    /// Sum of post ratings for one author; 0 when the author has no posts.
    async fn sum_rating_by_author(&self, author_id: Uuid) -> Result<i64, RepoError>;

    /// Apply a like/dislike delta to the post's rating.
    async fn adjust_rating(&self, post_id: Uuid, delta: i32) -> Result<(), RepoError>;

    /// Categories the post belongs to.
    async fn categories_of(&self, post_id: Uuid) -> Result<Vec<Category>, RepoError>;

    /// Replace the post's category memberships.
    async fn set_categories(&self, post_id: Uuid, category_ids: &[Uuid]) -> Result<(), RepoError>;

    /// Posts matching all provided filters (AND semantics).
    async fn search(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError>;

    /// Posts created at or after `since`, newest first. Feeds the digest job.
    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>, RepoError>;

    async fn list_by_kind(
        &self,
        kind: PostKind,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Sum of ratings over comments written by the user; 0 when none.
    async fn sum_rating_by_user(&self, user_id: Uuid) -> Result<i64, RepoError>;

    /// Sum of ratings over comments left on any of the author's posts;
    /// 0 when none.
    async fn sum_rating_on_author_posts(&self, author_id: Uuid) -> Result<i64, RepoError>;

    async fn adjust_rating(&self, comment_id: Uuid, delta: i32) -> Result<(), RepoError>;
}

/// Job execution history, written by the scheduler and pruned by the purge job.
#[async_trait]
pub trait JobExecutionRepository: Send + Sync {
    async fn record(&self, execution: JobExecution) -> Result<(), RepoError>;

    /// Delete executions that finished before `cutoff`; returns how many
    /// rows went away.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, RepoError>;
}
