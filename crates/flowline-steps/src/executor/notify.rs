//! Notification step executor.

use std::sync::Arc;

use crate::collab::{NotificationChannel, Notifier, TemplateProvider};
use crate::context::RunContext;
use crate::error::StepError;
use crate::result::StepResult;
use crate::step::NotificationConfig;
use crate::template::TemplateResolver;

/// Resolves the message, loads the template record, and dispatches
/// through the notifier.
pub struct NotifyExecutor {
    notifier: Arc<dyn Notifier>,
    templates: Arc<dyn TemplateProvider>,
    resolver: TemplateResolver,
}

impl NotifyExecutor {
    pub fn new(notifier: Arc<dyn Notifier>, templates: Arc<dyn TemplateProvider>) -> Self {
        Self {
            notifier,
            templates,
            resolver: TemplateResolver::new(),
        }
    }

    pub async fn execute(
        &self,
        config: &NotificationConfig,
        ctx: &RunContext,
    ) -> Result<StepResult, StepError> {
        let Some(channel) = NotificationChannel::parse(&config.channel) else {
            return Ok(StepResult::failure(format!(
                "Unsupported notification channel: {}",
                config.channel
            )));
        };

        let mut subject = String::new();
        let mut content = config
            .message
            .as_deref()
            .map(|message| self.resolver.resolve(message, ctx));

        if let Some(ref template_id) = config.template {
            match self.templates.get_notification_template(template_id).await {
                Ok(Some(template)) => {
                    subject = self.resolver.resolve(&template.subject, ctx);
                    if content.is_none() {
                        content = Some(self.resolver.resolve(&template.content, ctx));
                    }
                }
                Ok(None) => {
                    return Ok(StepResult::failure(format!(
                        "Notification template not found: {}",
                        template_id
                    )));
                }
                Err(e) => {
                    return Ok(StepResult::failure(format!(
                        "Notification template lookup failed: {}",
                        e
                    )));
                }
            }
        }

        let content = content.unwrap_or_default();

        match self
            .notifier
            .send(channel, &config.recipients, &subject, &content)
            .await
        {
            Ok(()) => Ok(StepResult::success(serde_json::json!({
                "channel": channel,
                "recipients": config.recipients.len(),
                "delivered": true,
            }))),
            Err(e) => Ok(StepResult::failure(format!(
                "Notification dispatch failed: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::NotificationTemplate;
    use crate::executor::testing::{FakeNotifier, FakeTemplates};
    use std::collections::HashMap;

    fn ctx_with(field: &str, value: serde_json::Value) -> RunContext {
        let mut payload = HashMap::new();
        payload.insert(field.to_string(), value);
        RunContext::new("wf-1", "user-1", payload)
    }

    fn config(channel: &str) -> NotificationConfig {
        NotificationConfig {
            channel: channel.to_string(),
            recipients: vec!["ops@example.com".to_string()],
            template: None,
            message: Some("Deploy {status}".to_string()),
        }
    }

    #[tokio::test]
    async fn test_message_resolved_and_dispatched() {
        let notifier = Arc::new(FakeNotifier::default());
        let executor = NotifyExecutor::new(notifier.clone(), Arc::new(FakeTemplates::default()));

        let ctx = ctx_with("status", serde_json::json!("complete"));
        let result = executor.execute(&config("email"), &ctx).await.unwrap();

        assert!(result.is_success());
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, NotificationChannel::Email);
        assert_eq!(sent[0].3, "Deploy complete");
    }

    #[tokio::test]
    async fn test_unsupported_channel_message() {
        let executor = NotifyExecutor::new(
            Arc::new(FakeNotifier::default()),
            Arc::new(FakeTemplates::default()),
        );

        let ctx = ctx_with("status", serde_json::json!("complete"));
        let result = executor.execute(&config("pager"), &ctx).await.unwrap();

        assert!(!result.is_success());
        assert_eq!(
            result.error,
            Some("Unsupported notification channel: pager".to_string())
        );
    }

    #[tokio::test]
    async fn test_template_supplies_subject_and_content() {
        let mut templates = FakeTemplates::default();
        templates.templates.insert(
            "welcome".to_string(),
            NotificationTemplate {
                subject: "Welcome {user_id}".to_string(),
                content: "Glad you joined, {user_id}.".to_string(),
            },
        );

        let notifier = Arc::new(FakeNotifier::default());
        let executor = NotifyExecutor::new(notifier.clone(), Arc::new(templates));

        let mut config = config("slack");
        config.template = Some("welcome".to_string());
        config.message = None;

        let ctx = RunContext::new("wf-1", "user-9", HashMap::new());
        let result = executor.execute(&config, &ctx).await.unwrap();

        assert!(result.is_success());
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent[0].2, "Welcome user-9");
        assert_eq!(sent[0].3, "Glad you joined, user-9.");
    }

    #[tokio::test]
    async fn test_missing_template_fails_step() {
        let executor = NotifyExecutor::new(
            Arc::new(FakeNotifier::default()),
            Arc::new(FakeTemplates::default()),
        );

        let mut config = config("email");
        config.template = Some("ghost".to_string());

        let ctx = ctx_with("status", serde_json::json!("x"));
        let result = executor.execute(&config, &ctx).await.unwrap();

        assert!(!result.is_success());
        assert!(result.error.unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_notifier_failure_is_captured() {
        let notifier = Arc::new(FakeNotifier {
            fail: true,
            ..Default::default()
        });
        let executor = NotifyExecutor::new(notifier, Arc::new(FakeTemplates::default()));

        let ctx = ctx_with("status", serde_json::json!("x"));
        let result = executor.execute(&config("sms"), &ctx).await.unwrap();

        assert!(!result.is_success());
        assert!(result.error.unwrap().contains("dispatch failed"));
    }
}
