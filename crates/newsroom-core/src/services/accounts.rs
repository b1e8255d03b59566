//! Account commands: registration, profile updates, author upgrade,
//! category subscription.
//!
//! The welcome message is an explicit call inside the registration command -
//! not a save hook - so it fires exactly once per account and profile updates
//! can never re-trigger it.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Author, User};
use crate::error::DomainError;
use crate::ports::{AuthorRepository, BaseRepository, CategoryRepository, UserRepository};
use crate::services::notification::NotificationDispatcher;

/// Input to the registration command. The password arrives pre-hashed; the
/// domain never sees plaintext credentials.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    authors: Arc<dyn AuthorRepository>,
    categories: Arc<dyn CategoryRepository>,
    notifier: Arc<NotificationDispatcher>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        authors: Arc<dyn AuthorRepository>,
        categories: Arc<dyn CategoryRepository>,
        notifier: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            users,
            authors,
            categories,
            notifier,
        }
    }

    /// Create an account and send the one-time welcome message.
    pub async fn register(&self, account: NewAccount) -> Result<User, DomainError> {
        if account.username.trim().is_empty() {
            return Err(DomainError::Validation("username must not be empty".into()));
        }
        if !account.email.contains('@') {
            return Err(DomainError::Validation("invalid email address".into()));
        }

        if self.users.find_by_email(&account.email).await?.is_some() {
            return Err(DomainError::Duplicate("email already registered".into()));
        }
        if self
            .users
            .find_by_username(&account.username)
            .await?
            .is_some()
        {
            return Err(DomainError::Duplicate("username already taken".into()));
        }

        let user = User::new(account.username, account.email, account.password_hash);
        let user = self.users.save(user).await?;

        // Registration is durable at this point; a failed welcome send is
        // logged by the dispatcher and does not surface.
        self.notifier.send_welcome(&user).await;

        Ok(user)
    }

    /// Update profile fields. Sends nothing.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<User, DomainError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        if let Some(username) = changes.username {
            if username.trim().is_empty() {
                return Err(DomainError::Validation("username must not be empty".into()));
            }
            user.username = username;
        }
        if let Some(email) = changes.email {
            if !email.contains('@') {
                return Err(DomainError::Validation("invalid email address".into()));
            }
            user.email = email;
        }
        user.updated_at = Utc::now();

        Ok(self.users.save(user).await?)
    }

    /// Grant the author capability and create the author row. Idempotent:
    /// upgrading an existing author returns the existing row.
    pub async fn upgrade_to_author(&self, user_id: Uuid) -> Result<Author, DomainError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        if let Some(author) = self.authors.find_by_user_id(user.id).await? {
            return Ok(author);
        }

        let author = self.authors.save(Author::new(user.id)).await?;

        user.is_author = true;
        user.updated_at = Utc::now();
        self.users.save(user).await?;

        Ok(author)
    }

    /// Subscribe the user to a category and confirm it to them - and only
    /// them; other subscribers of the category hear nothing.
    pub async fn subscribe(&self, user_id: Uuid, category_id: Uuid) -> Result<(), DomainError> {
        let category = self
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", category_id))?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        self.categories.add_subscriber(category.id, user.id).await?;

        self.notifier
            .send_subscription_confirmation(&user, &category)
            .await;

        Ok(())
    }
}
