//! Run context threaded through workflow steps.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Reserved runtime-data field that always carries the submitting user's id.
pub const USER_ID_FIELD: &str = "user_id";

/// Mutable runtime data for one workflow run.
///
/// Seeded from the run request's input payload plus the reserved
/// `user_id` field. Steps read fields from the mapping; step outputs are
/// collected separately under their step ids and are not merged back
/// here (a data-transformation step replacing the `data` field is the
/// one exception, handled by the engine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    /// Unique execution id for this run.
    pub execution_id: Uuid,

    /// Workflow being executed.
    pub workflow_id: String,

    /// User the run belongs to.
    pub user_id: String,

    /// Runtime data fields available to steps and templates.
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl RunContext {
    /// Create a new run context seeded from an input payload.
    ///
    /// The reserved `user_id` field always reflects the submitting user,
    /// shadowing any same-named key in the payload.
    pub fn new(
        workflow_id: impl Into<String>,
        user_id: impl Into<String>,
        payload: HashMap<String, serde_json::Value>,
    ) -> Self {
        let user_id = user_id.into();
        let mut data = payload;
        data.insert(USER_ID_FIELD.to_string(), serde_json::json!(user_id));

        Self {
            execution_id: Uuid::new_v4(),
            workflow_id: workflow_id.into(),
            user_id,
            data,
        }
    }

    /// Get a runtime-data field.
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }

    /// Set a runtime-data field.
    pub fn set(&mut self, field: impl Into<String>, value: serde_json::Value) {
        self.data.insert(field.into(), value);
    }

    /// Get a field as its string representation.
    pub fn get_str(&self, field: &str) -> Option<String> {
        self.data.get(field).map(value_to_string)
    }
}

/// String representation of a JSON value for interpolation and grouping.
///
/// Strings render without quotes; compound values render as compact JSON.
pub fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
