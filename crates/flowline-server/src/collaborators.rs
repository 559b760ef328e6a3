//! Collaborator wiring from configuration.

use async_trait::async_trait;
use std::sync::Arc;

use flowline_steps::collab::{
    Completion, CompletionRequest, CompletionService, HttpCompletionService, NotificationChannel,
    WebhookNotifier,
};
use flowline_steps::CollabError;

use crate::config::AppConfig;

/// Stand-in completion service used when no endpoint is configured.
///
/// AI processing steps against it fail cleanly inside their step result
/// instead of failing the whole server at startup.
struct UnconfiguredCompletion;

#[async_trait]
impl CompletionService for UnconfiguredCompletion {
    async fn complete(&self, _request: &CompletionRequest) -> Result<Completion, CollabError> {
        Err(CollabError::Unavailable(
            "no completion endpoint configured".to_string(),
        ))
    }
}

/// Build the completion service from configuration.
pub fn build_completion(config: &AppConfig) -> Arc<dyn CompletionService> {
    match &config.completion_url {
        Some(url) => {
            tracing::info!(endpoint = %url, "Completion service configured");
            Arc::new(HttpCompletionService::new(url.clone()))
        }
        None => {
            tracing::warn!("No completion endpoint configured, AI steps will fail");
            Arc::new(UnconfiguredCompletion)
        }
    }
}

/// Build the webhook notifier from configuration.
pub fn build_notifier(config: &AppConfig) -> WebhookNotifier {
    let mut notifier = WebhookNotifier::new();

    if let Some(ref url) = config.email_webhook_url {
        notifier = notifier.with_endpoint(NotificationChannel::Email, url.clone());
    }
    if let Some(ref url) = config.slack_webhook_url {
        notifier = notifier.with_endpoint(NotificationChannel::Slack, url.clone());
    }
    if let Some(ref url) = config.sms_webhook_url {
        notifier = notifier.with_endpoint(NotificationChannel::Sms, url.clone());
    }

    notifier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_completion_errors() {
        let service = build_completion(&AppConfig::default());
        let request = CompletionRequest {
            prompt: "hi".to_string(),
            use_case: None,
            user_id: "u-1".to_string(),
            provider: None,
        };

        let result = service.complete(&request).await;
        assert!(matches!(result, Err(CollabError::Unavailable(_))));
    }

    #[test]
    fn test_notifier_channels_follow_config() {
        let config = AppConfig {
            slack_webhook_url: Some("http://localhost/slack".to_string()),
            ..Default::default()
        };

        let notifier = build_notifier(&config);
        assert!(notifier.supports(NotificationChannel::Slack));
        assert!(!notifier.supports(NotificationChannel::Email));
    }
}
