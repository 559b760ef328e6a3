//! Data transformation step executor.

use serde_json::Value;

use crate::context::{value_to_string, RunContext};
use crate::error::StepError;
use crate::result::StepResult;
use crate::step::{FieldMapping, FilterRule, TransformConfig, TransformKind};

/// Runtime-data field the transformations operate on.
const DATA_FIELD: &str = "data";

/// Applies filter/map/aggregate transformations to the run's data.
pub struct TransformExecutor;

impl TransformExecutor {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        config: &TransformConfig,
        ctx: &RunContext,
    ) -> Result<StepResult, StepError> {
        // Transformations read the `data` field; absent that, the whole
        // input payload is the subject.
        let input = match ctx.get(DATA_FIELD) {
            Some(value) => value.clone(),
            None => Value::Object(ctx.data.clone().into_iter().collect()),
        };

        if config.kind == TransformKind::Unknown {
            // Permissive by design: unrecognized kinds pass the input through.
            return Ok(StepResult::success(input));
        }

        let Value::Array(items) = input else {
            return Ok(StepResult::failure(
                "transformation input is not a collection",
            ));
        };

        let output = match config.kind {
            TransformKind::Filter => filter(items, &config.conditions),
            TransformKind::Map => map(items, &config.mappings),
            TransformKind::Aggregate => {
                let group_by = config.group_by.as_deref().ok_or_else(|| {
                    StepError::Configuration(
                        "aggregate transformation requires group_by".to_string(),
                    )
                })?;
                aggregate(items, group_by)
            }
            TransformKind::Unknown => Value::Array(items),
        };

        Ok(StepResult::success(output))
    }
}

impl Default for TransformExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep elements where every rule matches with strict equality.
fn filter(items: Vec<Value>, rules: &[FilterRule]) -> Value {
    let kept: Vec<Value> = items
        .into_iter()
        .filter(|item| {
            rules
                .iter()
                .all(|rule| item.get(&rule.field) == Some(&rule.value))
        })
        .collect();

    Value::Array(kept)
}

/// Rebuild each element from the ordered source -> target renames.
///
/// Fields not listed are dropped; missing sources are skipped.
fn map(items: Vec<Value>, mappings: &[FieldMapping]) -> Value {
    let mapped: Vec<Value> = items
        .into_iter()
        .map(|item| {
            let mut out = serde_json::Map::new();
            for mapping in mappings {
                if let Some(value) = item.get(&mapping.source) {
                    out.insert(mapping.target.clone(), value.clone());
                }
            }
            Value::Object(out)
        })
        .collect();

    Value::Array(mapped)
}

/// Group elements by the string representation of the grouping field.
fn aggregate(items: Vec<Value>, group_by: &str) -> Value {
    let mut groups = serde_json::Map::new();

    for item in items {
        let key = item
            .get(group_by)
            .map(value_to_string)
            .unwrap_or_else(|| "null".to_string());

        if let Value::Array(bucket) = groups.entry(key).or_insert_with(|| Value::Array(Vec::new()))
        {
            bucket.push(item);
        }
    }

    Value::Object(groups)
}
