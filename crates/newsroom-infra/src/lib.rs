//! # Newsroom Infrastructure
//!
//! Concrete implementations of the ports defined in `newsroom-core`:
//! PostgreSQL repositories via SeaORM, in-memory repositories for tests and
//! database-less runs, the mailer and template-renderer adapters, and
//! JWT/Argon2 authentication.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory adapters only
//! - `postgres` - PostgreSQL support via SeaORM
//! - `auth` - JWT + Argon2 authentication

pub mod database;
pub mod mail;
pub mod memory;
pub mod template;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use mail::{RecordingMailer, TracingMailer};
pub use memory::{
    InMemoryAuthorRepository, InMemoryCategoryRepository, InMemoryCommentRepository,
    InMemoryJobExecutionRepository, InMemoryPostRepository, InMemoryUserRepository,
};
pub use template::TemplateRegistry;

pub use database::{DatabaseConfig, DatabaseConnection};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtTokenService};

// Re-exports - Postgres
#[cfg(feature = "postgres")]
pub use database::{
    PostgresAuthorRepository, PostgresCategoryRepository, PostgresCommentRepository,
    PostgresJobExecutionRepository, PostgresPostRepository, PostgresUserRepository,
};
