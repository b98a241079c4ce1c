//! Resend HTTP API sender

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

use super::{EmailMessage, EmailSender};

const DEFAULT_API_URL: &str = "https://api.resend.com";

#[derive(Clone)]
pub struct ResendSender {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl ResendSender {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Required: `RESEND_API_KEY`. Optional: `RESEND_API_URL`
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            std::env::var("RESEND_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Some(Self::new(&base_url, api_key.trim()))
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[async_trait]
impl EmailSender for ResendSender {
    async fn send(&self, message: &EmailMessage) -> Result<String> {
        let response = self
            .http_client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| Error::DependencyFailure(format!("Email request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::DependencyFailure(format!(
                "Resend API error {}: {}",
                status, body
            )));
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| Error::DependencyFailure(format!("Unexpected Resend response: {}", e)))?;
        debug!(email_id = %sent.id, recipients = message.to.len(), "Email accepted by Resend");
        Ok(sent.id)
    }

    fn name(&self) -> &str {
        "resend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_url() {
        let sender = ResendSender::new("https://api.resend.com/", "re_123");
        assert_eq!(sender.base_url, "https://api.resend.com");
        assert_eq!(sender.name(), "resend");
    }

    #[test]
    fn test_message_body_shape() {
        let message = EmailMessage {
            from: "onboarding@resend.dev".into(),
            to: vec!["ana@example.com".into()],
            subject: "Lembrete".into(),
            html: "<p>oi</p>".into(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["to"][0], "ana@example.com");
        assert_eq!(json["html"], "<p>oi</p>");
    }
}
