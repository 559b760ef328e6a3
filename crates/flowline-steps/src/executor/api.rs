//! API call step executor.

use std::sync::Arc;

use crate::collab::{HttpCallRequest, HttpCaller};
use crate::context::RunContext;
use crate::error::StepError;
use crate::result::StepResult;
use crate::step::ApiCallConfig;
use crate::template::TemplateResolver;

/// Issues HTTP requests through the HTTP collaborator.
pub struct ApiExecutor {
    http: Arc<dyn HttpCaller>,
    resolver: TemplateResolver,
}

impl ApiExecutor {
    pub fn new(http: Arc<dyn HttpCaller>) -> Self {
        Self {
            http,
            resolver: TemplateResolver::new(),
        }
    }

    pub async fn execute(
        &self,
        config: &ApiCallConfig,
        ctx: &RunContext,
    ) -> Result<StepResult, StepError> {
        let body = config
            .body
            .as_ref()
            .map(|body| self.resolver.resolve_value(body, &ctx.data));

        let request = HttpCallRequest {
            method: config.method.clone(),
            url: config.url.clone(),
            headers: config.headers.clone(),
            body,
        };

        match self.http.call(&request).await {
            Ok(response) if response.is_success() => Ok(StepResult::success(response.body)),
            Ok(response) => Ok(StepResult::failure(format!(
                "API call failed: {}",
                response.status
            ))),
            Err(e) => Ok(StepResult::failure(format!("API call failed: {}", e))),
        }
    }
}
