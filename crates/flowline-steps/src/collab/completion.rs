//! HTTP client for the text-completion collaborator.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::CollabError;

use super::{Completion, CompletionRequest, CompletionService};

/// Completion service that POSTs requests to a gateway endpoint.
///
/// The gateway owns provider selection; this client only forwards the
/// prompt, use case, user and provider hint, and maps non-success
/// statuses to [`CollabError::Status`].
pub struct HttpCompletionService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCompletionService {
    /// Create a client for the given completion endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl CompletionService for HttpCompletionService {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CollabError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            use_case = ?request.use_case,
            provider = ?request.provider,
            "Requesting completion"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollabError::Status(status.as_u16()));
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<Completion>(&text) {
            Ok(completion) => Ok(completion),
            // Plain-text completion endpoints return the body directly.
            Err(_) => Ok(Completion {
                text,
                provider: None,
                model: None,
            }),
        }
    }
}
