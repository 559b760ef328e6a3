//! Workflow definition types.

use flowline_steps::step::Step;
use serde::{Deserialize, Serialize};

/// A declarative workflow: an ordered list of typed steps.
///
/// Owned by the workflow store and immutable once fetched for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Workflow identifier.
    pub id: String,

    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Steps in declared execution order.
    pub steps: Vec<Step>,
}

impl WorkflowDefinition {
    /// Get a step by id.
    pub fn get_step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// All step ids in declaration order.
    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }

    /// Number of steps.
    pub fn total_steps(&self) -> u32 {
        self.steps.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definition_from_json() {
        let json = serde_json::json!({
            "id": "daily-digest",
            "name": "Daily digest",
            "steps": [
                {
                    "id": "summarize",
                    "type": "ai_processing",
                    "config": {"prompt": "Summarize {data}"}
                },
                {
                    "id": "send",
                    "type": "notification",
                    "config": {"channel": "email", "message": "{summary}"},
                    "dependencies": ["summarize"]
                }
            ]
        });

        let definition: WorkflowDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(definition.id, "daily-digest");
        assert_eq!(definition.total_steps(), 2);
        assert_eq!(definition.step_ids(), vec!["summarize", "send"]);
        assert!(definition.get_step("send").is_some());
        assert!(definition.get_step("missing").is_none());
    }
}
