//! Workflow run engine.
//!
//! Drives one run through `Loading -> Running -> {Completed, Failed}`:
//! loads the definition from the workflow store, executes the steps,
//! collects per-step results, and hands the finalized record to the
//! recorder. Step failures are isolated: a failing step never stops the
//! run. The run itself only fails when the workflow cannot be loaded or
//! an executor violates its no-throw contract.

mod record;

pub use record::{ExecutionRecord, RunStatus, TriggerKind};

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use flowline_steps::step::{Step, StepAction};
use flowline_steps::{RunContext, StepResult, StepRunner};

use crate::recorder::ExecutionRecorder;
use crate::store::WorkflowStore;
use crate::workflow::{topological_order, WorkflowDefinition};

/// Engine behavior toggles. Defaults preserve the reference semantics:
/// declaration-order execution, no timeout enforcement.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Treat per-step `timeout` as a cancellation deadline.
    pub enforce_timeouts: bool,

    /// Execute steps in dependency order instead of declaration order.
    pub dependency_order: bool,
}

/// Run submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Workflow to execute.
    pub workflow_id: String,

    /// Submitting user.
    pub user_id: String,

    /// How the run was triggered.
    #[serde(default)]
    pub trigger: TriggerKind,

    /// Input payload seeding the runtime data.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,

    /// Caller-supplied metadata, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

impl RunRequest {
    /// Validate the request before a run starts.
    pub fn validate(&self) -> Result<(), String> {
        if self.workflow_id.trim().is_empty() {
            return Err("'workflow_id' must not be empty".to_string());
        }
        if self.user_id.trim().is_empty() {
            return Err("'user_id' must not be empty".to_string());
        }
        Ok(())
    }
}

/// Run-level counters reported to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub execution_time_ms: u64,
    pub steps_completed: u32,
    pub total_steps: u32,
}

/// Response returned to the run submitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// True when the run completed.
    pub success: bool,

    pub workflow_id: String,
    pub execution_id: Uuid,
    pub status: RunStatus,

    /// Top-level error for failed runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Per-step results keyed by step id.
    pub results: HashMap<String, StepResult>,

    pub metadata: RunMetadata,
}

impl From<ExecutionRecord> for RunSummary {
    fn from(record: ExecutionRecord) -> Self {
        Self {
            success: record.status.is_completed(),
            workflow_id: record.workflow_id,
            execution_id: record.execution_id,
            status: record.status,
            error: record.error,
            results: record.results,
            metadata: RunMetadata {
                execution_time_ms: record.execution_time_ms,
                steps_completed: record.steps_completed,
                total_steps: record.total_steps,
            },
        }
    }
}

/// Executes workflow runs.
pub struct WorkflowEngine {
    store: Arc<dyn WorkflowStore>,
    runner: StepRunner,
    recorder: ExecutionRecorder,
    options: EngineOptions,
}

impl WorkflowEngine {
    /// Create an engine with default options.
    pub fn new(store: Arc<dyn WorkflowStore>, runner: StepRunner, recorder: ExecutionRecorder) -> Self {
        Self {
            store,
            runner,
            recorder,
            options: EngineOptions::default(),
        }
    }

    /// Override the engine options.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Execute one run to completion.
    ///
    /// Always returns a structured summary; the matching execution
    /// record is persisted best-effort before returning.
    pub async fn run(&self, request: RunRequest) -> RunSummary {
        let started_at = Utc::now();
        let started = Instant::now();

        let mut ctx = RunContext::new(
            request.workflow_id.clone(),
            request.user_id.clone(),
            request.data.clone(),
        );
        let execution_id = ctx.execution_id;

        tracing::info!(
            execution_id = %execution_id,
            workflow_id = %request.workflow_id,
            trigger = %request.trigger,
            "Starting workflow run"
        );

        // Loading
        let definition = match self.store.get_workflow(&request.workflow_id).await {
            Ok(Some(definition)) => definition,
            Ok(None) => {
                let error = format!("Workflow not found: {}", request.workflow_id);
                return self
                    .finalize(&request, execution_id, started_at, started.elapsed(), RunStatus::Failed, HashMap::new(), Some(error), 0, 0)
                    .await;
            }
            Err(e) => {
                let error = format!("Workflow lookup failed: {}", e);
                return self
                    .finalize(&request, execution_id, started_at, started.elapsed(), RunStatus::Failed, HashMap::new(), Some(error), 0, 0)
                    .await;
            }
        };

        let total_steps = definition.total_steps();

        // Definition invariants are checked before any step runs.
        let order = match self.plan(&definition) {
            Ok(order) => order,
            Err(error) => {
                return self
                    .finalize(&request, execution_id, started_at, started.elapsed(), RunStatus::Failed, HashMap::new(), Some(error), 0, total_steps)
                    .await;
            }
        };

        // Running
        let mut results: HashMap<String, StepResult> = HashMap::with_capacity(order.len());
        let mut steps_completed: u32 = 0;
        let mut run_error: Option<String> = None;

        for idx in order {
            let step = &definition.steps[idx];

            tracing::debug!(
                execution_id = %execution_id,
                step = %step.id,
                kind = step.action.kind(),
                "Executing step"
            );

            match self.invoke_step(step, &ctx).await {
                Ok(result) => {
                    if !result.is_success() {
                        tracing::warn!(
                            execution_id = %execution_id,
                            step = %step.id,
                            error = result.error.as_deref().unwrap_or(""),
                            "Step reported failure, continuing run"
                        );
                    } else if let StepAction::DataTransformation(_) = step.action {
                        // A successful transformation replaces the run's
                        // data wholesale.
                        if let Some(ref output) = result.result {
                            ctx.set("data", output.clone());
                        }
                    }

                    results.insert(step.id.clone(), result);
                    steps_completed += 1;
                }
                Err(message) => {
                    // The executor broke its no-throw contract; stop here.
                    tracing::error!(
                        execution_id = %execution_id,
                        step = %step.id,
                        error = %message,
                        "Engine fault, aborting remaining steps"
                    );
                    run_error = Some(format!("Step '{}' {}", step.id, message));
                    break;
                }
            }
        }

        let status = if run_error.is_some() {
            RunStatus::Failed
        } else {
            RunStatus::Completed
        };

        self.finalize(&request, execution_id, started_at, started.elapsed(), status, results, run_error, steps_completed, total_steps)
            .await
    }

    /// Execution order for the definition.
    fn plan(&self, definition: &WorkflowDefinition) -> Result<Vec<usize>, String> {
        // Always validates unique ids, known references and acyclicity.
        let topological = topological_order(definition).map_err(|e| e.to_string())?;

        if self.options.dependency_order {
            Ok(topological)
        } else {
            Ok((0..definition.steps.len()).collect())
        }
    }

    /// Run one step behind the engine-fault boundary.
    ///
    /// `Err` carries the panic message from an executor that violated
    /// its no-throw contract.
    async fn invoke_step(&self, step: &Step, ctx: &RunContext) -> Result<StepResult, String> {
        let fut = AssertUnwindSafe(self.runner.run(step, ctx)).catch_unwind();

        let deadline = step
            .timeout
            .filter(|_| self.options.enforce_timeouts)
            .map(Duration::from_secs);

        let caught = match deadline {
            Some(deadline) => match tokio::time::timeout(deadline, fut).await {
                Ok(caught) => caught,
                Err(_) => {
                    return Ok(StepResult::failure(format!(
                        "Step timed out after {} seconds",
                        deadline.as_secs()
                    )));
                }
            },
            None => fut.await,
        };

        caught.map_err(panic_message)
    }

    /// Build, persist and report the final record.
    #[allow(clippy::too_many_arguments)]
    async fn finalize(
        &self,
        request: &RunRequest,
        execution_id: Uuid,
        started_at: chrono::DateTime<Utc>,
        elapsed: Duration,
        status: RunStatus,
        results: HashMap<String, StepResult>,
        error: Option<String>,
        steps_completed: u32,
        total_steps: u32,
    ) -> RunSummary {
        let record = ExecutionRecord {
            execution_id,
            workflow_id: request.workflow_id.clone(),
            user_id: request.user_id.clone(),
            trigger: request.trigger,
            status,
            results,
            error,
            execution_time_ms: elapsed.as_millis() as u64,
            steps_completed,
            total_steps,
            started_at,
            finished_at: Utc::now(),
        };

        self.recorder.record(&record).await;

        tracing::info!(
            execution_id = %record.execution_id,
            workflow_id = %record.workflow_id,
            status = %record.status,
            steps_completed = record.steps_completed,
            total_steps = record.total_steps,
            execution_time_ms = record.execution_time_ms,
            "Workflow run finished"
        );

        record.into()
    }
}

/// Human-readable message from a caught panic payload.
fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}
