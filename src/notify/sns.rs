//! AWS SNS notifier implementation.
//!
//! Email contacts are delivered through a preconfigured topic (the
//! subscription carries the address); phone contacts are published
//! directly as SMS.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::Client as SnsClient;
use tracing::{debug, info};

use super::{Destination, Notifier, NotifyError, Result};
use crate::config::SnsConfig;

/// AWS SNS implementation of [`Notifier`].
pub struct SnsNotifier {
    client: SnsClient,
    topic_arn: String,
}

impl SnsNotifier {
    /// Create a notifier against the configured topic.
    pub async fn new(config: &SnsConfig) -> Self {
        let mut aws_config_builder = aws_config::defaults(BehaviorVersion::latest());

        if let Some(ref region) = config.region {
            aws_config_builder =
                aws_config_builder.region(aws_config::Region::new(region.clone()));
        }

        if let Some(ref endpoint) = config.endpoint_url {
            aws_config_builder = aws_config_builder.endpoint_url(endpoint);
        }

        let aws_config = aws_config_builder.load().await;
        let client = SnsClient::new(&aws_config);

        info!(
            topic_arn = %config.topic_arn,
            region = ?config.region,
            "Connected to AWS SNS"
        );

        Self {
            client,
            topic_arn: config.topic_arn.clone(),
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn send(&self, destination: &Destination, subject: &str, body: &str) -> Result<()> {
        let request = self.client.publish().message(body);

        let request = match destination {
            Destination::Email(_) => request.topic_arn(&self.topic_arn).subject(subject),
            Destination::Sms(phone) => request.phone_number(phone),
        };

        let output = request
            .send()
            .await
            .map_err(|e| NotifyError::Publish(format!("Failed to publish to SNS: {}", e)))?;

        debug!(
            destination = ?destination,
            message_id = ?output.message_id,
            "Published alert to SNS"
        );

        Ok(())
    }
}
