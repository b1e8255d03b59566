//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod mail;
mod repository;
mod template;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use mail::{MailError, Mailer, OutboundEmail};
pub use repository::{
    AuthorRepository, BaseRepository, CategoryRepository, CommentRepository,
    JobExecutionRepository, PostRepository, UserRepository,
};
pub use template::{TemplateError, TemplateRenderer, TemplateVars};
