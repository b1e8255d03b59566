//! In-memory repository implementations.
//!
//! These back the database-less mode and the service-layer tests. All
//! repositories share one store so cross-entity queries (subscriber fan-out,
//! the rating sums, search-by-author-username) behave like the relational
//! versions. Note: data is lost on process restart.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use newsroom_core::domain::{Author, Category, Comment, JobExecution, Post, PostFilter, User};
use newsroom_core::error::RepoError;
use newsroom_core::ports::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository,
    JobExecutionRepository, PostRepository, UserRepository,
};

#[derive(Default)]
struct StoreInner {
    users: HashMap<Uuid, User>,
    authors: HashMap<Uuid, Author>,
    categories: HashMap<Uuid, Category>,
    /// (category_id, user_id)
    subscriptions: HashSet<(Uuid, Uuid)>,
    posts: HashMap<Uuid, Post>,
    /// (post_id, category_id)
    post_categories: HashSet<(Uuid, Uuid)>,
    comments: HashMap<Uuid, Comment>,
    job_executions: Vec<JobExecution>,
}

/// Shared backing store for the in-memory repositories.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

pub struct InMemoryUserRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.inner.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        self.store
            .inner
            .write()
            .await
            .users
            .insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .inner
            .write()
            .await
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

pub struct InMemoryAuthorRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryAuthorRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryAuthorRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        Ok(self.store.inner.read().await.authors.get(&id).cloned())
    }

    async fn save(&self, author: Author) -> Result<Author, RepoError> {
        self.store
            .inner
            .write()
            .await
            .authors
            .insert(author.id, author.clone());
        Ok(author)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .inner
            .write()
            .await
            .authors
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl AuthorRepository for InMemoryAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .authors
            .values()
            .find(|a| a.user_id == user_id)
            .cloned())
    }

    async fn set_rating(&self, author_id: Uuid, rating: i64) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        let author = inner.authors.get_mut(&author_id).ok_or(RepoError::NotFound)?;
        author.rating = rating;
        Ok(())
    }
}

pub struct InMemoryCategoryRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryCategoryRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.store.inner.read().await.categories.get(&id).cloned())
    }

    async fn save(&self, category: Category) -> Result<Category, RepoError> {
        self.store
            .inner
            .write()
            .await
            .categories
            .insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        inner.subscriptions.retain(|(cid, _)| *cid != id);
        inner
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner.categories.values().find(|c| c.name == name).cloned())
    }

    async fn subscribers(&self, category_id: Uuid) -> Result<Vec<User>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .subscriptions
            .iter()
            .filter(|(cid, _)| *cid == category_id)
            .filter_map(|(_, uid)| inner.users.get(uid).cloned())
            .collect())
    }

    async fn add_subscriber(&self, category_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        self.store
            .inner
            .write()
            .await
            .subscriptions
            .insert((category_id, user_id));
        Ok(())
    }

    async fn is_subscriber(&self, category_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        Ok(self
            .store
            .inner
            .read()
            .await
            .subscriptions
            .contains(&(category_id, user_id)))
    }
}

pub struct InMemoryPostRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryPostRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.inner.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.store
            .inner
            .write()
            .await
            .posts
            .insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        // Mirror the relational cascade.
        inner.post_categories.retain(|(pid, _)| *pid != id);
        inner.comments.retain(|_, c| c.post_id != id);
        inner.posts.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let inner = self.store.inner.read().await;
        let mut posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn count_by_author_since(
        &self,
        author_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .posts
            .values()
            .filter(|p| p.author_id == author_id && p.created_at >= since)
            .count() as u64)
    }

    async fn sum_rating_by_author(&self, author_id: Uuid) -> Result<i64, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .map(|p| i64::from(p.rating))
            .sum())
    }

    async fn adjust_rating(&self, post_id: Uuid, delta: i32) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        let post = inner.posts.get_mut(&post_id).ok_or(RepoError::NotFound)?;
        post.rating += delta;
        Ok(())
    }

    async fn categories_of(&self, post_id: Uuid) -> Result<Vec<Category>, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .post_categories
            .iter()
            .filter(|(pid, _)| *pid == post_id)
            .filter_map(|(_, cid)| inner.categories.get(cid).cloned())
            .collect())
    }

    async fn set_categories(&self, post_id: Uuid, category_ids: &[Uuid]) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        inner.post_categories.retain(|(pid, _)| *pid != post_id);
        for cid in category_ids {
            inner.post_categories.insert((post_id, *cid));
        }
        Ok(())
    }

    async fn search(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let inner = self.store.inner.read().await;

        let title_needle = filter.title.as_deref().map(str::to_lowercase);
        let author_needle = filter.author_username.as_deref().map(str::to_lowercase);

        let mut posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| {
                if let Some(needle) = &title_needle {
                    if !p.title.to_lowercase().contains(needle) {
                        return false;
                    }
                }
                if let Some(needle) = &author_needle {
                    let username = inner
                        .authors
                        .get(&p.author_id)
                        .and_then(|a| inner.users.get(&a.user_id))
                        .map(|u| u.username.to_lowercase());
                    match username {
                        Some(name) if name.contains(needle) => {}
                        _ => return false,
                    }
                }
                if let Some(after) = filter.created_after {
                    if p.created_at <= after {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let inner = self.store.inner.read().await;
        let mut posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| p.created_at >= since)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn list_by_kind(
        &self,
        kind: newsroom_core::domain::PostKind,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let inner = self.store.inner.read().await;
        let mut posts: Vec<Post> = inner
            .posts
            .values()
            .filter(|p| p.kind == kind)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

pub struct InMemoryCommentRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryCommentRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryCommentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.store.inner.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        self.store
            .inner
            .write()
            .await
            .comments
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .inner
            .write()
            .await
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let inner = self.store.inner.read().await;
        let mut comments: Vec<Comment> = inner
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn sum_rating_by_user(&self, user_id: Uuid) -> Result<i64, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .comments
            .values()
            .filter(|c| c.user_id == user_id)
            .map(|c| i64::from(c.rating))
            .sum())
    }

    async fn sum_rating_on_author_posts(&self, author_id: Uuid) -> Result<i64, RepoError> {
        let inner = self.store.inner.read().await;
        Ok(inner
            .comments
            .values()
            .filter(|c| {
                inner
                    .posts
                    .get(&c.post_id)
                    .is_some_and(|p| p.author_id == author_id)
            })
            .map(|c| i64::from(c.rating))
            .sum())
    }

    async fn adjust_rating(&self, comment_id: Uuid, delta: i32) -> Result<(), RepoError> {
        let mut inner = self.store.inner.write().await;
        let comment = inner
            .comments
            .get_mut(&comment_id)
            .ok_or(RepoError::NotFound)?;
        comment.rating += delta;
        Ok(())
    }
}

pub struct InMemoryJobExecutionRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryJobExecutionRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }

    pub async fn all(&self) -> Vec<JobExecution> {
        self.store.inner.read().await.job_executions.clone()
    }
}

#[async_trait]
impl JobExecutionRepository for InMemoryJobExecutionRepository {
    async fn record(&self, execution: JobExecution) -> Result<(), RepoError> {
        self.store
            .inner
            .write()
            .await
            .job_executions
            .push(execution);
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut inner = self.store.inner.write().await;
        let before = inner.job_executions.len();
        inner.job_executions.retain(|e| e.finished_at >= cutoff);
        Ok((before - inner.job_executions.len()) as u64)
    }
}

#[cfg(test)]
mod tests;
