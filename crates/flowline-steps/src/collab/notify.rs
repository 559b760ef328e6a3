//! Webhook-backed notification transport.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::CollabError;

use super::{NotificationChannel, Notifier};

/// Notifier that relays messages to per-channel webhook endpoints.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoints: HashMap<NotificationChannel, String>,
}

/// Wire payload posted to a channel webhook.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    recipients: &'a [String],
    subject: &'a str,
    content: &'a str,
}

impl WebhookNotifier {
    /// Create a notifier with no channels configured.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoints: HashMap::new(),
        }
    }

    /// Configure the webhook endpoint for a channel.
    pub fn with_endpoint(mut self, channel: NotificationChannel, url: impl Into<String>) -> Self {
        self.endpoints.insert(channel, url.into());
        self
    }

    /// Returns true if the channel has an endpoint configured.
    pub fn supports(&self, channel: NotificationChannel) -> bool {
        self.endpoints.contains_key(&channel)
    }
}

impl Default for WebhookNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(
        &self,
        channel: NotificationChannel,
        recipients: &[String],
        subject: &str,
        content: &str,
    ) -> Result<(), CollabError> {
        let endpoint = self.endpoints.get(&channel).ok_or_else(|| {
            CollabError::Unavailable(format!("no webhook configured for channel {}", channel))
        })?;

        tracing::debug!(
            channel = %channel,
            recipients = recipients.len(),
            "Dispatching notification"
        );

        let response = self
            .client
            .post(endpoint)
            .json(&WebhookPayload {
                recipients,
                subject,
                content,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollabError::Status(status.as_u16()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports() {
        let notifier = WebhookNotifier::new()
            .with_endpoint(NotificationChannel::Email, "http://localhost/email");

        assert!(notifier.supports(NotificationChannel::Email));
        assert!(!notifier.supports(NotificationChannel::Sms));
    }

    #[tokio::test]
    async fn test_unconfigured_channel_is_unavailable() {
        let notifier = WebhookNotifier::new();
        let result = notifier
            .send(NotificationChannel::Sms, &[], "subject", "content")
            .await;

        assert!(matches!(result, Err(CollabError::Unavailable(_))));
    }
}
