//! Mailer port - abstraction over the outbound email transport.

use async_trait::async_trait;

/// One outbound message, fully rendered. The notification dispatcher is the
/// only producer.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl OutboundEmail {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        text_body: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text_body: text_body.into(),
            html_body: html_body.into(),
        }
    }
}

/// Mailer trait - abstraction over email transports.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a single message. A failure here is scoped to one recipient;
    /// callers must not treat it as fatal to a batch.
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

/// Mailer errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid recipient address: {0}")]
    InvalidAddress(String),

    #[error("Transport error: {0}")]
    Transport(String),
}
