//! Condition step executor.

use std::cmp::Ordering;

use serde_json::Value;

use crate::context::RunContext;
use crate::error::StepError;
use crate::result::StepResult;
use crate::step::{ConditionConfig, ConditionOperator, ConditionRule, LogicalOperator};

/// Evaluates ordered conditions against runtime data.
pub struct ConditionExecutor;

impl ConditionExecutor {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        config: &ConditionConfig,
        ctx: &RunContext,
    ) -> Result<StepResult, StepError> {
        let results: Vec<bool> = config
            .conditions
            .iter()
            .map(|rule| evaluate_rule(rule, ctx))
            .collect();

        let condition_result = match config.logical_operator {
            LogicalOperator::And => results.iter().all(|matched| *matched),
            LogicalOperator::Or => results.iter().any(|matched| *matched),
        };

        Ok(StepResult::success(serde_json::json!({
            "condition_result": condition_result,
            "per_condition_results": results,
        })))
    }
}

impl Default for ConditionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate one rule. Unknown operators are false, never an error.
fn evaluate_rule(rule: &ConditionRule, ctx: &RunContext) -> bool {
    let actual = ctx.get(&rule.field);

    match rule.operator {
        ConditionOperator::Equals => actual == Some(&rule.value),
        ConditionOperator::NotEquals => actual != Some(&rule.value),
        ConditionOperator::Contains => match (actual.and_then(Value::as_str), rule.value.as_str())
        {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
        ConditionOperator::GreaterThan => {
            matches!(compare(actual, &rule.value), Some(Ordering::Greater))
        }
        ConditionOperator::LessThan => {
            matches!(compare(actual, &rule.value), Some(Ordering::Less))
        }
        ConditionOperator::Unknown => false,
    }
}

/// Ordering between a field value and the expected value.
///
/// Numeric when both operands are numbers, lexicographic when both are
/// strings; any other pairing does not compare.
fn compare(actual: Option<&Value>, expected: &Value) -> Option<Ordering> {
    match (actual?, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}
