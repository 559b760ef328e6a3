//! Collaborator interfaces consumed by step executors.
//!
//! Every external capability the engine touches goes through one of
//! these narrow traits so runs stay testable with in-process fakes.
//! Production implementations live in the submodules.

mod completion;
mod http;
mod notify;

pub use completion::HttpCompletionService;
pub use http::ReqwestCaller;
pub use notify::WebhookNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::CollabError;
use crate::step::HttpMethod;

/// Request to the text-completion collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Resolved prompt text.
    pub prompt: String,

    /// Use case hint for provider routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,

    /// User the completion is billed/attributed to.
    pub user_id: String,

    /// Preferred provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Completion payload returned by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Generated text.
    pub text: String,

    /// Provider that served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Model identifier, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Text-completion service used by AI processing steps.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion request.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CollabError>;
}

/// Named delivery channel for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Slack,
    Sms,
}

impl NotificationChannel {
    /// Parse a channel name from step configuration.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "email" => Some(NotificationChannel::Email),
            "slack" | "chat" => Some(NotificationChannel::Slack),
            "sms" => Some(NotificationChannel::Sms),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationChannel::Email => write!(f, "email"),
            NotificationChannel::Slack => write!(f, "slack"),
            NotificationChannel::Sms => write!(f, "sms"),
        }
    }
}

/// Stored notification template (subject + content).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTemplate {
    pub subject: String,
    pub content: String,
}

/// Notification transport used by notification steps.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Dispatch a message through the given channel.
    async fn send(
        &self,
        channel: NotificationChannel,
        recipients: &[String],
        subject: &str,
        content: &str,
    ) -> Result<(), CollabError>;
}

/// Notification template lookup, a narrow view of the workflow store.
#[async_trait]
pub trait TemplateProvider: Send + Sync {
    /// Fetch a template record by id.
    async fn get_notification_template(
        &self,
        id: &str,
    ) -> Result<Option<NotificationTemplate>, CollabError>;
}

/// Outbound HTTP request issued by API call steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpCallRequest {
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// Response from the HTTP collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpCallResponse {
    /// HTTP status code.
    pub status: u16,

    /// Parsed response body (JSON when possible, text otherwise).
    pub body: serde_json::Value,
}

impl HttpCallResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client used by API call steps.
#[async_trait]
pub trait HttpCaller: Send + Sync {
    /// Issue the request and return the status + parsed body.
    async fn call(&self, request: &HttpCallRequest) -> Result<HttpCallResponse, CollabError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse() {
        assert_eq!(
            NotificationChannel::parse("email"),
            Some(NotificationChannel::Email)
        );
        assert_eq!(
            NotificationChannel::parse("Slack"),
            Some(NotificationChannel::Slack)
        );
        assert_eq!(
            NotificationChannel::parse("chat"),
            Some(NotificationChannel::Slack)
        );
        assert_eq!(
            NotificationChannel::parse("sms"),
            Some(NotificationChannel::Sms)
        );
        assert_eq!(NotificationChannel::parse("pager"), None);
    }

    #[test]
    fn test_response_success_range() {
        let ok = HttpCallResponse {
            status: 204,
            body: serde_json::Value::Null,
        };
        assert!(ok.is_success());

        let err = HttpCallResponse {
            status: 404,
            body: serde_json::Value::Null,
        };
        assert!(!err.is_success());
    }

    #[test]
    fn test_completion_request_serialization() {
        let request = CompletionRequest {
            prompt: "hello".to_string(),
            use_case: None,
            user_id: "u-1".to_string(),
            provider: Some("openai".to_string()),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"prompt\":\"hello\""));
        assert!(!json.contains("use_case"));
    }
}
