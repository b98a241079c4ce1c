//! In-memory sender for tests and local development

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{EmailMessage, EmailSender};

/// Records every message it is asked to send
#[derive(Clone, Default)]
pub struct MockSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    /// When set, every send fails with a dependency error
    pub failing: bool,
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Messages delivered so far
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmailSender for MockSender {
    async fn send(&self, message: &EmailMessage) -> Result<String> {
        if self.failing {
            return Err(Error::DependencyFailure("mock sender rejected message".into()));
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| Error::DependencyFailure("mock sender lock poisoned".into()))?;
        sent.push(message.clone());
        Ok(format!("mock-{}", sent.len()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_sender_records_nothing() {
        let sender = MockSender::failing();
        let message = EmailMessage {
            from: "a@b.c".into(),
            to: vec!["d@e.f".into()],
            subject: "s".into(),
            html: String::new(),
        };
        assert!(matches!(
            sender.send(&message).await,
            Err(Error::DependencyFailure(_))
        ));
        assert!(sender.sent().is_empty());
    }
}
