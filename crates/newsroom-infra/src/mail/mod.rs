//! Mailer implementations.
//!
//! Outbound transport is an external collaborator; the adapters here are a
//! log-only mailer for running without one and a recording mailer for tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use newsroom_core::ports::{MailError, Mailer, OutboundEmail};

/// Mailer that logs every message instead of delivering it.
pub struct TracingMailer {
    from: String,
}

impl TracingMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var("MAIL_FROM").unwrap_or_else(|_| "newsroom@localhost".to_string()),
        )
    }
}

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        if !email.to.contains('@') {
            return Err(MailError::InvalidAddress(email.to));
        }

        tracing::info!(
            from = %self.from,
            to = %email.to,
            subject = %email.subject,
            "Outbound email (transport disabled)"
        );
        Ok(())
    }
}

/// Mailer that captures every message in memory. Addresses registered via
/// [`fail_for`](Self::fail_for) fail with a transport error instead, which is
/// how the per-recipient isolation tests exercise delivery failures.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `address` fail.
    pub fn fail_for(&self, address: impl Into<String>) {
        self.failing.lock().unwrap().insert(address.into());
    }

    /// Everything successfully "delivered" so far.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, address: &str) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.to == address)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        if self.failing.lock().unwrap().contains(&email.to) {
            return Err(MailError::Transport(format!(
                "simulated delivery failure to {}",
                email.to
            )));
        }

        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}
