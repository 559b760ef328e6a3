//! AI processing step executor.

use std::sync::Arc;

use crate::collab::{CompletionRequest, CompletionService};
use crate::context::RunContext;
use crate::error::StepError;
use crate::result::StepResult;
use crate::step::AiProcessingConfig;
use crate::template::TemplateResolver;

/// Resolves the prompt template and calls the completion collaborator.
pub struct AiExecutor {
    completion: Arc<dyn CompletionService>,
    resolver: TemplateResolver,
}

impl AiExecutor {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self {
            completion,
            resolver: TemplateResolver::new(),
        }
    }

    pub async fn execute(
        &self,
        config: &AiProcessingConfig,
        ctx: &RunContext,
    ) -> Result<StepResult, StepError> {
        let prompt = self.resolver.resolve(&config.prompt, ctx);

        let request = CompletionRequest {
            prompt,
            use_case: config.use_case.clone(),
            user_id: ctx.user_id.clone(),
            provider: config.provider.clone(),
        };

        match self.completion.complete(&request).await {
            Ok(completion) => Ok(StepResult::success(serde_json::to_value(completion)?)),
            Err(e) => Ok(StepResult::failure(format!("AI processing failed: {}", e))),
        }
    }
}
