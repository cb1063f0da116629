//! Notification delivery for low-stock alerts.
//!
//! This module contains:
//! - `Notifier` trait: deliver a subject + body to a destination
//! - `Destination`: static email/SMS dispatch from a contact string
//! - Implementations: AWS SNS, logging no-op, recording mock

use async_trait::async_trait;
use tracing::debug;

pub mod mock;
pub mod sns;

pub use mock::MockNotifier;
pub use sns::SnsNotifier;

/// Result type for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Publish failed: {0}")]
    Publish(String),
}

/// Where an alert should be delivered.
///
/// The split is a static dispatch rule, not a validated classification:
/// a contact containing `@` is treated as an email address, anything
/// else as a phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Email address, delivered via the configured topic.
    Email(String),
    /// Phone number, delivered as a direct SMS.
    Sms(String),
}

impl Destination {
    /// Classify a contact string.
    pub fn from_contact(contact: &str) -> Self {
        if contact.contains('@') {
            Self::Email(contact.to_string())
        } else {
            Self::Sms(contact.to_string())
        }
    }
}

/// Interface for alert delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message. Blocks until the backend acknowledges.
    async fn send(&self, destination: &Destination, subject: &str, body: &str) -> Result<()>;
}

/// Notifier that drops every message, for deployments without alerting.
#[derive(Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, destination: &Destination, subject: &str, _body: &str) -> Result<()> {
        debug!(destination = ?destination, subject = %subject, "Notifier disabled, dropping alert");
        Ok(())
    }
}
