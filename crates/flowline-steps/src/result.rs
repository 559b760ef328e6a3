//! Step execution result types.

use serde::{Deserialize, Serialize};

/// Result of executing one workflow step.
///
/// Step failures are materialized here rather than propagated: once an
/// executor returns, the result is immutable for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Whether the step succeeded.
    pub success: bool,

    /// Step-specific result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Error message if the step failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution duration in milliseconds.
    #[serde(default)]
    pub execution_time_ms: u64,
}

impl StepResult {
    /// Create a successful result with a payload.
    pub fn success(result: serde_json::Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            execution_time_ms: 0,
        }
    }

    /// Create a failed result with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(message.into()),
            execution_time_ms: 0,
        }
    }

    /// Set the execution duration.
    pub fn with_duration(mut self, execution_time_ms: u64) -> Self {
        self.execution_time_ms = execution_time_ms;
        self
    }

    /// Returns true if the step succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }
}
