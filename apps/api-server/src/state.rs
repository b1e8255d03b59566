//! Application state - shared across all handlers and jobs.

use std::sync::Arc;

use newsroom_core::ports::{
    AuthorRepository, CategoryRepository, CommentRepository, JobExecutionRepository,
    PostRepository, UserRepository,
};
use newsroom_core::services::{
    AccountService, DigestService, JobHistoryService, NotificationDispatcher, PublishingService,
    RatingService,
};
use newsroom_infra::database::DatabaseConfig;
use newsroom_infra::mail::TracingMailer;
use newsroom_infra::memory::{
    InMemoryAuthorRepository, InMemoryCategoryRepository, InMemoryCommentRepository,
    InMemoryJobExecutionRepository, InMemoryPostRepository, InMemoryStore, InMemoryUserRepository,
};
use newsroom_infra::template::TemplateRegistry;

#[cfg(feature = "postgres")]
use newsroom_infra::database::{
    DatabaseConnection, PostgresAuthorRepository, PostgresCategoryRepository,
    PostgresCommentRepository, PostgresJobExecutionRepository, PostgresPostRepository,
    PostgresUserRepository,
};

/// The repository set behind the services.
struct Repositories {
    users: Arc<dyn UserRepository>,
    authors: Arc<dyn AuthorRepository>,
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    executions: Arc<dyn JobExecutionRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        tracing::warn!("Running without a database - repositories are in-memory");
        let store = InMemoryStore::new();
        Self {
            users: Arc::new(InMemoryUserRepository::new(store.clone())),
            authors: Arc::new(InMemoryAuthorRepository::new(store.clone())),
            categories: Arc::new(InMemoryCategoryRepository::new(store.clone())),
            posts: Arc::new(InMemoryPostRepository::new(store.clone())),
            comments: Arc::new(InMemoryCommentRepository::new(store.clone())),
            executions: Arc::new(InMemoryJobExecutionRepository::new(store)),
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(db: &DatabaseConnection) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(db.conn.clone())),
            authors: Arc::new(PostgresAuthorRepository::new(db.conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.conn.clone())),
            executions: Arc::new(PostgresJobExecutionRepository::new(db.conn.clone())),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub authors: Arc<dyn AuthorRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub executions: Arc<dyn JobExecutionRepository>,

    pub accounts: Arc<AccountService>,
    pub publishing: Arc<PublishingService>,
    pub rating: Arc<RatingService>,
    pub digest: Arc<DigestService>,
    pub history: Arc<JobHistoryService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        let repos = match db_config {
            Some(config) => match DatabaseConnection::init(config).await {
                Ok(db) => Repositories::postgres(&db),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Repositories::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database.");
                Repositories::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repos = {
            let _ = db_config;
            Repositories::in_memory()
        };

        let mailer = Arc::new(TracingMailer::from_env());
        let renderer = Arc::new(TemplateRegistry::with_defaults());

        let dispatcher = Arc::new(NotificationDispatcher::new(
            repos.categories.clone(),
            repos.posts.clone(),
            renderer,
            mailer,
        ));

        let state = Self {
            accounts: Arc::new(AccountService::new(
                repos.users.clone(),
                repos.authors.clone(),
                repos.categories.clone(),
                dispatcher.clone(),
            )),
            publishing: Arc::new(PublishingService::new(
                repos.posts.clone(),
                repos.authors.clone(),
                dispatcher.clone(),
            )),
            rating: Arc::new(RatingService::new(
                repos.authors.clone(),
                repos.posts.clone(),
                repos.comments.clone(),
            )),
            digest: Arc::new(DigestService::new(repos.posts.clone(), dispatcher)),
            history: Arc::new(JobHistoryService::new(repos.executions.clone())),
            users: repos.users,
            authors: repos.authors,
            categories: repos.categories,
            posts: repos.posts,
            comments: repos.comments,
            executions: repos.executions,
        };

        tracing::info!("Application state initialized");
        state
    }
}
