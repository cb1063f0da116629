//! Mock notifier implementation for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Destination, Notifier, NotifyError, Result};

/// One delivered message recorded by [`MockNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub destination: Destination,
    pub subject: String,
    pub body: String,
}

/// Mock notifier for testing.
#[derive(Default)]
pub struct MockNotifier {
    sent: RwLock<Vec<SentMessage>>,
    fail_on_send: RwLock<bool>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_send(&self, fail: bool) {
        *self.fail_on_send.write().await = fail;
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.read().await.len()
    }

    pub async fn take_sent(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.sent.write().await)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, destination: &Destination, subject: &str, body: &str) -> Result<()> {
        if *self.fail_on_send.read().await {
            return Err(NotifyError::Publish("Mock publish failure".to_string()));
        }
        self.sent.write().await.push(SentMessage {
            destination: destination.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_sent_messages() {
        let notifier = MockNotifier::new();
        notifier
            .send(
                &Destination::Email("owner@example.com".to_string()),
                "Low Stock: Mug",
                "restock",
            )
            .await
            .unwrap();

        let sent = notifier.take_sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Low Stock: Mug");
        assert_eq!(notifier.sent_count().await, 0);
    }

    #[tokio::test]
    async fn test_fail_on_send() {
        let notifier = MockNotifier::new();
        notifier.set_fail_on_send(true).await;
        let result = notifier
            .send(
                &Destination::Sms("+15550001234".to_string()),
                "subject",
                "body",
            )
            .await;
        assert!(matches!(result, Err(NotifyError::Publish(_))));
    }
}
