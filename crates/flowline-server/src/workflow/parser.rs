//! Workflow definition parsing and validation.
//!
//! Definitions are accepted as JSON or YAML. Validation enforces the
//! structural invariants: a non-empty id, unique step ids, dependencies
//! that reference known steps, and an acyclic dependency graph.
//! Execution order stays declaration order; the topological order is
//! only used when dependency-ordered scheduling is enabled.

use std::collections::HashSet;

use crate::error::{AppError, AppResult};
use crate::workflow::WorkflowDefinition;

/// Parse a JSON workflow definition and validate it.
pub fn parse_definition_json(content: &str) -> AppResult<WorkflowDefinition> {
    let definition: WorkflowDefinition =
        serde_json::from_str(content).map_err(|e| AppError::Parse(e.to_string()))?;

    validate_definition(&definition)?;

    Ok(definition)
}

/// Parse a YAML workflow definition and validate it.
pub fn parse_definition_yaml(content: &str) -> AppResult<WorkflowDefinition> {
    let definition: WorkflowDefinition =
        serde_yaml::from_str(content).map_err(|e| AppError::Parse(e.to_string()))?;

    validate_definition(&definition)?;

    Ok(definition)
}

/// Validate a workflow definition's structural invariants.
pub fn validate_definition(definition: &WorkflowDefinition) -> AppResult<()> {
    if definition.id.trim().is_empty() {
        return Err(AppError::Validation(
            "Workflow id must not be empty".to_string(),
        ));
    }

    // Check for duplicate step ids
    let mut seen_steps = HashSet::new();
    for step in &definition.steps {
        if step.id.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Workflow '{}' contains a step with an empty id",
                definition.id
            )));
        }
        if !seen_steps.insert(&step.id) {
            return Err(AppError::Validation(format!(
                "Duplicate step id: {}",
                step.id
            )));
        }
    }

    // Check dependency references
    let step_ids: HashSet<&str> = definition.steps.iter().map(|s| s.id.as_str()).collect();
    for step in &definition.steps {
        for dependency in &step.dependencies {
            if !step_ids.contains(dependency.as_str()) {
                return Err(AppError::Validation(format!(
                    "Step '{}' references unknown step '{}' in dependencies",
                    step.id, dependency
                )));
            }
        }
    }

    // Acyclicity falls out of the topological sort
    topological_order(definition)?;

    Ok(())
}

/// Stable topological order over the step dependency graph.
///
/// Returns indices into `definition.steps`. Among ready steps the
/// declaration order is preserved, so dependency-free workflows keep
/// their declared order exactly.
pub fn topological_order(definition: &WorkflowDefinition) -> AppResult<Vec<usize>> {
    let total = definition.steps.len();
    let mut order = Vec::with_capacity(total);
    let mut done: HashSet<&str> = HashSet::with_capacity(total);
    let mut placed = vec![false; total];

    while order.len() < total {
        let mut advanced = false;

        for (idx, step) in definition.steps.iter().enumerate() {
            if placed[idx] {
                continue;
            }
            if step
                .dependencies
                .iter()
                .all(|dep| done.contains(dep.as_str()))
            {
                placed[idx] = true;
                done.insert(step.id.as_str());
                order.push(idx);
                advanced = true;
            }
        }

        if !advanced {
            let stuck: Vec<&str> = definition
                .steps
                .iter()
                .enumerate()
                .filter(|(idx, _)| !placed[*idx])
                .map(|(_, s)| s.id.as_str())
                .collect();

            return Err(AppError::Validation(format!(
                "Dependency cycle involving steps: {}",
                stuck.join(", ")
            )));
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(json: serde_json::Value) -> WorkflowDefinition {
        serde_json::from_value(json).unwrap()
    }

    fn condition_step(id: &str, dependencies: Vec<&str>) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "type": "condition",
            "config": {"conditions": []},
            "dependencies": dependencies,
        })
    }

    #[test]
    fn test_parse_valid_yaml() {
        let yaml = r#"
id: enrich-leads
name: Enrich leads
steps:
  - id: fetch
    type: api_call
    config:
      url: https://api.example.com/leads
  - id: filter
    type: data_transformation
    config:
      kind: filter
      conditions:
        - field: active
          value: true
    dependencies: [fetch]
"#;

        let result = parse_definition_yaml(yaml);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().total_steps(), 2);
    }

    #[test]
    fn test_empty_id_rejected() {
        let def = definition(serde_json::json!({"id": " ", "steps": []}));
        let result = validate_definition(&def);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_step_ids_rejected() {
        let def = definition(serde_json::json!({
            "id": "wf",
            "steps": [condition_step("a", vec![]), condition_step("a", vec![])]
        }));

        let result = validate_definition(&def);
        assert!(result.unwrap_err().to_string().contains("Duplicate"));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let def = definition(serde_json::json!({
            "id": "wf",
            "steps": [condition_step("a", vec!["ghost"])]
        }));

        let result = validate_definition(&def);
        assert!(result.unwrap_err().to_string().contains("unknown step"));
    }

    #[test]
    fn test_dependency_cycle_rejected() {
        let def = definition(serde_json::json!({
            "id": "wf",
            "steps": [
                condition_step("a", vec!["b"]),
                condition_step("b", vec!["a"]),
            ]
        }));

        let result = validate_definition(&def);
        assert!(result.unwrap_err().to_string().contains("cycle"));
    }

    #[test]
    fn test_self_dependency_rejected() {
        let def = definition(serde_json::json!({
            "id": "wf",
            "steps": [condition_step("a", vec!["a"])]
        }));

        assert!(validate_definition(&def).is_err());
    }

    #[test]
    fn test_topological_order_is_stable() {
        // c depends on a; declaration order b, c, a
        let def = definition(serde_json::json!({
            "id": "wf",
            "steps": [
                condition_step("b", vec![]),
                condition_step("c", vec!["a"]),
                condition_step("a", vec![]),
            ]
        }));

        let order = topological_order(&def).unwrap();
        let ids: Vec<&str> = order.iter().map(|&i| def.steps[i].id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_topological_order_without_dependencies_keeps_declaration() {
        let def = definition(serde_json::json!({
            "id": "wf",
            "steps": [
                condition_step("x", vec![]),
                condition_step("y", vec![]),
                condition_step("z", vec![]),
            ]
        }));

        let order = topological_order(&def).unwrap();
        assert_eq!(order, vec![0, 1, 2]);
    }
}
