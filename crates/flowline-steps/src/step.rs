//! Workflow step model.
//!
//! A step is a typed unit of work: its `type` selects the executor and
//! its `config` carries the executor-specific parameters. The step set
//! is a closed union dispatched through a single match in the runner.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One step in a workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Step id, unique within the workflow.
    pub id: String,

    /// Step type and its configuration.
    #[serde(flatten)]
    pub action: StepAction,

    /// Ids of steps that must already have produced a result.
    ///
    /// Validated for acyclicity; execution order stays declaration order
    /// unless dependency-ordered scheduling is enabled on the engine.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Step timeout in seconds. Only enforced when the engine opts in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Step type with its configuration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum StepAction {
    /// Text completion through the AI collaborator.
    AiProcessing(AiProcessingConfig),
    /// Filter/map/aggregate over the runtime `data` collection.
    DataTransformation(TransformConfig),
    /// Dispatch a message through a notification channel.
    Notification(NotificationConfig),
    /// Call an external HTTP endpoint.
    ApiCall(ApiCallConfig),
    /// Evaluate conditions against runtime data.
    Condition(ConditionConfig),
}

impl StepAction {
    /// Step kind name as it appears in definitions.
    pub fn kind(&self) -> &'static str {
        match self {
            StepAction::AiProcessing(_) => "ai_processing",
            StepAction::DataTransformation(_) => "data_transformation",
            StepAction::Notification(_) => "notification",
            StepAction::ApiCall(_) => "api_call",
            StepAction::Condition(_) => "condition",
        }
    }
}

/// Configuration for AI processing steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiProcessingConfig {
    /// Prompt template, resolved against runtime data.
    pub prompt: String,

    /// Use case hint forwarded to the completion service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,

    /// Preferred provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Transformation kind.
///
/// Unknown kinds deserialize to [`TransformKind::Unknown`] and pass the
/// input through unchanged rather than failing the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Filter,
    Map,
    Aggregate,
    Unknown,
}

impl<'de> Deserialize<'de> for TransformKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let kind = String::deserialize(deserializer)?;
        Ok(match kind.as_str() {
            "filter" => TransformKind::Filter,
            "map" => TransformKind::Map,
            "aggregate" => TransformKind::Aggregate,
            _ => TransformKind::Unknown,
        })
    }
}

/// Configuration for data transformation steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Which transformation to apply.
    pub kind: TransformKind,

    /// Match rules for `filter`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<FilterRule>,

    /// Ordered field renames for `map`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<FieldMapping>,

    /// Grouping field for `aggregate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
}

/// Exact-match rule for the `filter` transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRule {
    /// Element field to inspect.
    pub field: String,
    /// Value the field must equal (strict equality, no coercion).
    pub value: serde_json::Value,
}

/// Field rename for the `map` transformation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Field to read from each element.
    pub source: String,
    /// Field name in the output element.
    pub target: String,
}

/// Configuration for notification steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Delivery channel name (email, slack, sms).
    pub channel: String,

    /// Recipients forwarded to the notifier.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,

    /// Notification template id, looked up through the workflow store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Message template, resolved against runtime data. Takes precedence
    /// over the stored template's content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// HTTP method for API call steps.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[allow(clippy::upper_case_acronyms)] // HTTP methods are conventionally uppercase
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::PATCH => reqwest::Method::PATCH,
            HttpMethod::DELETE => reqwest::Method::DELETE,
            HttpMethod::HEAD => reqwest::Method::HEAD,
            HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
        }
    }
}

/// Configuration for API call steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCallConfig {
    /// Endpoint URL.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: HttpMethod,

    /// Request headers.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Request body template; string leaves are resolved against runtime
    /// data before the request is issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// Comparison operator for condition steps.
///
/// Unknown operators deserialize to [`ConditionOperator::Unknown`] and
/// evaluate to false without aborting the remaining conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    Unknown,
}

impl<'de> Deserialize<'de> for ConditionOperator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let operator = String::deserialize(deserializer)?;
        Ok(match operator.as_str() {
            "equals" => ConditionOperator::Equals,
            "not_equals" => ConditionOperator::NotEquals,
            "contains" => ConditionOperator::Contains,
            "greater_than" => ConditionOperator::GreaterThan,
            "less_than" => ConditionOperator::LessThan,
            _ => ConditionOperator::Unknown,
        })
    }
}

/// How per-condition booleans combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// One condition evaluated against runtime data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionRule {
    /// Runtime-data field to inspect.
    pub field: String,

    /// Comparison operator.
    #[serde(default)]
    pub operator: ConditionOperator,

    /// Value to compare against.
    pub value: serde_json::Value,
}

/// Configuration for condition steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionConfig {
    /// Ordered conditions to evaluate.
    #[serde(default)]
    pub conditions: Vec<ConditionRule>,

    /// Combining operator (default: AND).
    #[serde(default)]
    pub logical_operator: LogicalOperator,
}
