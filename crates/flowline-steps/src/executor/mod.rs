//! Step executors and dispatch.
//!
//! One executor per step kind, dispatched through a single match on the
//! closed [`StepAction`] union. Executors never raise past this module:
//! the runner converts internal errors into failed step results and
//! stamps the execution duration.

mod ai;
mod api;
mod condition;
mod notify;
mod transform;

pub use ai::AiExecutor;
pub use api::ApiExecutor;
pub use condition::ConditionExecutor;
pub use notify::NotifyExecutor;
pub use transform::TransformExecutor;

use std::sync::Arc;
use std::time::Instant;

use crate::collab::{CompletionService, HttpCaller, Notifier, TemplateProvider};
use crate::context::RunContext;
use crate::result::StepResult;
use crate::step::{Step, StepAction};

/// Executes workflow steps against a run context.
pub struct StepRunner {
    ai: AiExecutor,
    transform: TransformExecutor,
    notify: NotifyExecutor,
    api: ApiExecutor,
    condition: ConditionExecutor,
}

impl StepRunner {
    /// Create a runner wired to the given collaborators.
    pub fn new(
        completion: Arc<dyn CompletionService>,
        notifier: Arc<dyn Notifier>,
        templates: Arc<dyn TemplateProvider>,
        http: Arc<dyn HttpCaller>,
    ) -> Self {
        Self {
            ai: AiExecutor::new(completion),
            transform: TransformExecutor::new(),
            notify: NotifyExecutor::new(notifier, templates),
            api: ApiExecutor::new(http),
            condition: ConditionExecutor::new(),
        }
    }

    /// Execute one step. Failures come back inside the [`StepResult`].
    pub async fn run(&self, step: &Step, ctx: &RunContext) -> StepResult {
        let start = Instant::now();

        let outcome = match &step.action {
            StepAction::AiProcessing(config) => self.ai.execute(config, ctx).await,
            StepAction::DataTransformation(config) => self.transform.execute(config, ctx),
            StepAction::Notification(config) => self.notify.execute(config, ctx).await,
            StepAction::ApiCall(config) => self.api.execute(config, ctx).await,
            StepAction::Condition(config) => self.condition.execute(config, ctx),
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => result.with_duration(duration_ms),
            Err(e) => {
                tracing::warn!(
                    step = %step.id,
                    kind = step.action.kind(),
                    error = %e,
                    "Step execution failed"
                );
                StepResult::failure(e.to_string()).with_duration(duration_ms)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared collaborator fakes for executor tests.

    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::collab::{
        Completion, CompletionRequest, CompletionService, HttpCallRequest, HttpCallResponse,
        HttpCaller, NotificationChannel, NotificationTemplate, Notifier, TemplateProvider,
    };
    use crate::error::CollabError;

    /// Completion fake returning a canned response or error status.
    pub struct FakeCompletion {
        pub response: Result<String, u16>,
    }

    #[async_trait]
    impl CompletionService for FakeCompletion {
        async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CollabError> {
            match &self.response {
                Ok(text) => Ok(Completion {
                    text: text.replace("{prompt}", &request.prompt),
                    provider: Some("fake".to_string()),
                    model: None,
                }),
                Err(status) => Err(CollabError::Status(*status)),
            }
        }
    }

    /// Notifier fake recording every dispatch.
    #[derive(Default)]
    pub struct FakeNotifier {
        pub sent: Mutex<Vec<(NotificationChannel, usize, String, String)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        async fn send(
            &self,
            channel: NotificationChannel,
            recipients: &[String],
            subject: &str,
            content: &str,
        ) -> Result<(), CollabError> {
            if self.fail {
                return Err(CollabError::Unavailable("notifier down".to_string()));
            }
            self.sent.lock().unwrap().push((
                channel,
                recipients.len(),
                subject.to_string(),
                content.to_string(),
            ));
            Ok(())
        }
    }

    /// Template provider fake backed by a map.
    #[derive(Default)]
    pub struct FakeTemplates {
        pub templates: HashMap<String, NotificationTemplate>,
    }

    #[async_trait]
    impl TemplateProvider for FakeTemplates {
        async fn get_notification_template(
            &self,
            id: &str,
        ) -> Result<Option<NotificationTemplate>, CollabError> {
            Ok(self.templates.get(id).cloned())
        }
    }

    /// HTTP fake returning a fixed status + body.
    pub struct FakeHttp {
        pub status: u16,
        pub body: serde_json::Value,
        pub requests: Mutex<Vec<HttpCallRequest>>,
    }

    impl FakeHttp {
        pub fn new(status: u16, body: serde_json::Value) -> Self {
            Self {
                status,
                body,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpCaller for FakeHttp {
        async fn call(&self, request: &HttpCallRequest) -> Result<HttpCallResponse, CollabError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(HttpCallResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }
}
