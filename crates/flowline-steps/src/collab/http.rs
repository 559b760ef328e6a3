//! reqwest-backed HTTP collaborator.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::CollabError;

use super::{HttpCallRequest, HttpCallResponse, HttpCaller};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP collaborator backed by a shared [`reqwest::Client`].
pub struct ReqwestCaller {
    client: reqwest::Client,
}

impl ReqwestCaller {
    /// Create a caller with the default client.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Create a caller with a custom client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestCaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpCaller for ReqwestCaller {
    async fn call(&self, request: &HttpCallRequest) -> Result<HttpCallResponse, CollabError> {
        let method: reqwest::Method = request.method.clone().into();
        let mut builder = self.client.request(method, &request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if let Some(ref body) = request.body {
            builder = match body {
                serde_json::Value::String(s) => builder.body(s.clone()),
                _ => builder.json(body),
            };
        }

        tracing::debug!(url = %request.url, method = ?request.method, "Issuing HTTP call");

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let text = response.text().await.unwrap_or_default();
        let body: serde_json::Value =
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));

        Ok(HttpCallResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::HttpMethod;

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest::Method::from(HttpMethod::GET), reqwest::Method::GET);
        assert_eq!(
            reqwest::Method::from(HttpMethod::DELETE),
            reqwest::Method::DELETE
        );
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let caller = ReqwestCaller::new();
        let request = HttpCallRequest {
            method: HttpMethod::GET,
            url: "not a url".to_string(),
            headers: Default::default(),
            body: None,
        };

        let result = caller.call(&request).await;
        assert!(matches!(result, Err(CollabError::Transport(_))));
    }
}
