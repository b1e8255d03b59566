//! Notification dispatcher.
//!
//! Every trigger produces one outbound message per recipient. Fan-out is
//! best-effort per recipient: sends run concurrently, one failed delivery
//! never blocks the rest, and failures are collected into a report so the
//! caller can log them without rolling anything back.

use std::sync::Arc;

use futures::future;

use crate::domain::{Category, Post, User};
use crate::error::DomainError;
use crate::ports::{
    CategoryRepository, Mailer, OutboundEmail, PostRepository, TemplateRenderer, TemplateVars,
};

/// Characters of post content included in a notification.
const NOTIFICATION_PREVIEW_LEN: usize = 50;

/// One recipient the dispatcher could not deliver to.
#[derive(Debug)]
pub struct DeliveryFailure {
    pub recipient: String,
    pub reason: String,
}

/// Outcome of one fan-out batch.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    pub fn attempted(&self) -> usize {
        self.sent + self.failures.len()
    }

    pub fn all_delivered(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: DeliveryReport) {
        self.sent += other.sent;
        self.failures.extend(other.failures);
    }
}

/// Resolves recipients and formats/sends notifications through the mailer.
pub struct NotificationDispatcher {
    categories: Arc<dyn CategoryRepository>,
    posts: Arc<dyn PostRepository>,
    renderer: Arc<dyn TemplateRenderer>,
    mailer: Arc<dyn Mailer>,
}

impl NotificationDispatcher {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        posts: Arc<dyn PostRepository>,
        renderer: Arc<dyn TemplateRenderer>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            categories,
            posts,
            renderer,
            mailer,
        }
    }

    /// Fan out a published post to every subscriber of every category it
    /// belongs to - one message per (category, subscriber) pair, so a user
    /// subscribed to two matching categories receives two messages.
    pub async fn notify_post_published(&self, post: &Post) -> Result<DeliveryReport, DomainError> {
        let categories = self.posts.categories_of(post.id).await?;
        let preview = content_preview(&post.content);

        let mut emails = Vec::new();
        for category in &categories {
            for subscriber in self.categories.subscribers(category.id).await? {
                emails.push(self.post_email(post, category, &subscriber, &preview));
            }
        }

        let report = self.dispatch(emails).await;
        tracing::info!(
            post_id = %post.id,
            categories = categories.len(),
            sent = report.sent,
            failed = report.failures.len(),
            "Post notification fan-out finished"
        );
        Ok(report)
    }

    /// One welcome message to a newly registered user. Callers invoke this
    /// from the registration command only, never from profile updates.
    pub async fn send_welcome(&self, user: &User) -> DeliveryReport {
        let text = format!(
            "Hi {}, thanks for signing up for our news portal!",
            user.username
        );
        let mut vars = TemplateVars::new();
        vars.insert("username", user.username.clone());
        let html = self.render_or_text("welcome_email", &vars, &text);

        self.dispatch(vec![OutboundEmail::new(
            &user.email,
            "Welcome to Newsroom",
            text,
            html,
        )])
        .await
    }

    /// One confirmation message to the subscribing user only.
    pub async fn send_subscription_confirmation(
        &self,
        user: &User,
        category: &Category,
    ) -> DeliveryReport {
        let text = format!("You are now subscribed to {}.", category.name);
        let mut vars = TemplateVars::new();
        vars.insert("username", user.username.clone());
        vars.insert("category", category.name.clone());
        let html = self.render_or_text("subscription_email", &vars, &text);

        self.dispatch(vec![OutboundEmail::new(
            &user.email,
            format!("Subscription to {}", category.name),
            text,
            html,
        )])
        .await
    }

    fn post_email(
        &self,
        post: &Post,
        category: &Category,
        subscriber: &User,
        preview: &str,
    ) -> OutboundEmail {
        let mut vars = TemplateVars::new();
        vars.insert("username", subscriber.username.clone());
        vars.insert("title", post.title.clone());
        vars.insert("preview", preview.to_string());
        vars.insert("category", category.name.clone());
        let html = self.render_or_text("new_post_email", &vars, preview);

        OutboundEmail::new(
            &subscriber.email,
            format!("New post in {}: {}", category.name, post.title),
            preview,
            html,
        )
    }

    /// Render the named template, falling back to the plain-text body when
    /// the template is missing or broken. Rendering problems are not
    /// delivery failures.
    fn render_or_text(&self, template: &str, vars: &TemplateVars, text: &str) -> String {
        match self.renderer.render(template, vars) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(template, error = %e, "Template render failed, sending text body");
                text.to_string()
            }
        }
    }

    /// Attempt every message concurrently, isolating failures per recipient.
    async fn dispatch(&self, emails: Vec<OutboundEmail>) -> DeliveryReport {
        let attempts = emails.into_iter().map(|email| {
            let mailer = Arc::clone(&self.mailer);
            async move {
                let recipient = email.to.clone();
                mailer.send(email).await.map_err(|e| DeliveryFailure {
                    recipient,
                    reason: e.to_string(),
                })
            }
        });

        let mut report = DeliveryReport::default();
        for result in future::join_all(attempts).await {
            match result {
                Ok(()) => report.sent += 1,
                Err(failure) => {
                    tracing::warn!(
                        recipient = %failure.recipient,
                        reason = %failure.reason,
                        "Notification delivery failed"
                    );
                    report.failures.push(failure);
                }
            }
        }
        report
    }
}

fn content_preview(content: &str) -> String {
    content.chars().take(NOTIFICATION_PREVIEW_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_first_50_chars() {
        let content = "a".repeat(80);
        assert_eq!(content_preview(&content).len(), 50);
    }

    #[test]
    fn short_content_previews_whole() {
        assert_eq!(content_preview("brief"), "brief");
    }

    #[test]
    fn report_merge_accumulates() {
        let mut a = DeliveryReport {
            sent: 2,
            failures: vec![],
        };
        a.merge(DeliveryReport {
            sent: 1,
            failures: vec![DeliveryFailure {
                recipient: "x@example.com".into(),
                reason: "boom".into(),
            }],
        });
        assert_eq!(a.sent, 3);
        assert_eq!(a.attempted(), 4);
        assert!(!a.all_delivered());
    }
}
