//! Execution records and run status.

use chrono::{DateTime, Utc};
use flowline_steps::StepResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// How a run was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    #[default]
    Manual,
    Schedule,
    Event,
    Webhook,
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerKind::Manual => write!(f, "manual"),
            TriggerKind::Schedule => write!(f, "schedule"),
            TriggerKind::Event => write!(f, "event"),
            TriggerKind::Webhook => write!(f, "webhook"),
        }
    }
}

/// Terminal status of a run.
///
/// A run completes when the engine finishes iterating its steps, even if
/// individual steps failed; it only fails when the workflow cannot be
/// loaded or an executor violates its no-throw contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
}

impl RunStatus {
    /// Returns true for completed runs.
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Persisted summary of one run. Written once, at run end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Run identity.
    pub execution_id: Uuid,

    /// Workflow that was executed.
    pub workflow_id: String,

    /// User the run belongs to.
    pub user_id: String,

    /// How the run was triggered.
    pub trigger: TriggerKind,

    /// Terminal status.
    pub status: RunStatus,

    /// Per-step results keyed by step id.
    pub results: HashMap<String, StepResult>,

    /// Top-level error for failed runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Total run duration in milliseconds.
    pub execution_time_ms: u64,

    /// Steps attempted (success or failure); never exceeds `total_steps`.
    pub steps_completed: u32,

    /// Steps in the workflow definition.
    pub total_steps: u32,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}
