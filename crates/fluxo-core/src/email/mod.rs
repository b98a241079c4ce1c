//! Outbound email delivery
//!
//! Unlike text generation, a failed send is reported to the caller: reminder
//! delivery is a requested action with an expected outcome.
//!
//! # Configuration
//!
//! Environment variables:
//! - `EMAIL_BACKEND`: Backend to use (resend, mock). Default: resend
//! - `RESEND_API_KEY`: API key (required for resend backend)
//! - `RESEND_API_URL`: API base URL (default: https://api.resend.com)

mod mock;
mod resend;

pub use mock::MockSender;
pub use resend::ResendSender;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single HTML email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Interface for all email delivery backends
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver `message`, returning the provider's message id
    async fn send(&self, message: &EmailMessage) -> Result<String>;

    /// Backend name (for logging)
    fn name(&self) -> &str;
}

/// Concrete email client
#[derive(Clone)]
pub enum EmailClient {
    Resend(ResendSender),
    Mock(MockSender),
}

impl EmailClient {
    /// Create a client from environment variables
    ///
    /// Returns None if the selected backend is not configured.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("EMAIL_BACKEND").unwrap_or_else(|_| "resend".to_string());

        match backend.to_lowercase().as_str() {
            "resend" => ResendSender::from_env().map(EmailClient::Resend),
            "mock" => Some(EmailClient::Mock(MockSender::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown EMAIL_BACKEND, falling back to resend");
                ResendSender::from_env().map(EmailClient::Resend)
            }
        }
    }

    pub fn mock() -> Self {
        EmailClient::Mock(MockSender::new())
    }
}

#[async_trait]
impl EmailSender for EmailClient {
    async fn send(&self, message: &EmailMessage) -> Result<String> {
        match self {
            EmailClient::Resend(s) => s.send(message).await,
            EmailClient::Mock(s) => s.send(message).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            EmailClient::Resend(s) => s.name(),
            EmailClient::Mock(s) => s.name(),
        }
    }
}
