//! Condition node: field/operator/value comparison selecting a `"true"`
//! or `"false"` branch label for the traversal.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::NodeError;

use super::executor::{NodeContext, NodeExecutor, NodeRunResult};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum ComparisonOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    Exists,
}

#[derive(Debug, Deserialize)]
struct ConditionNodeData {
    /// Dotted path into the evaluation root (the trigger payload unless
    /// `input` is set).
    #[serde(default)]
    field: String,
    #[serde(default = "default_operator")]
    operator: ComparisonOperator,
    #[serde(default)]
    value: Value,
    /// Optional pre-resolved root to evaluate against, e.g.
    /// `{{$nodes.<id>.output}}`.
    #[serde(default)]
    input: Option<Value>,
}

fn default_operator() -> ComparisonOperator {
    ComparisonOperator::Equals
}

pub struct ConditionNodeExecutor;

#[async_trait]
impl NodeExecutor for ConditionNodeExecutor {
    async fn execute(
        &self,
        _node_id: &str,
        config: &Value,
        context: &NodeContext,
    ) -> Result<NodeRunResult, NodeError> {
        let data: ConditionNodeData = serde_json::from_value(config.clone())
            .map_err(|e| NodeError::ConfigError(e.to_string()))?;

        let root = data.input.as_ref().unwrap_or(&context.payload);
        let actual = walk_path(root, &data.field);
        let matched = evaluate(data.operator, actual, &data.value);

        let branch = if matched { "true" } else { "false" };
        Ok(NodeRunResult::with_branch(
            json!({"result": matched, "branch": branch}),
            branch,
        ))
    }
}

fn walk_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn evaluate(operator: ComparisonOperator, actual: Option<&Value>, expected: &Value) -> bool {
    match operator {
        ComparisonOperator::Exists => matches!(actual, Some(v) if !v.is_null()),
        ComparisonOperator::Equals => match actual {
            Some(actual) => loose_eq(actual, expected),
            None => false,
        },
        ComparisonOperator::NotEquals => match actual {
            Some(actual) => !loose_eq(actual, expected),
            None => true,
        },
        ComparisonOperator::Contains => match actual {
            Some(Value::String(s)) => s.contains(&display(expected)),
            Some(Value::Array(items)) => items.iter().any(|item| loose_eq(item, expected)),
            _ => false,
        },
        ComparisonOperator::GreaterThan => match (actual.and_then(as_f64), as_f64(expected)) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        ComparisonOperator::LessThan => match (actual.and_then(as_f64), as_f64(expected)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
    }
}

/// Equality over display form, with a numeric fast path. Webhook payloads
/// routinely carry numbers as strings.
fn loose_eq(actual: &Value, expected: &Value) -> bool {
    if let (Some(a), Some(b)) = (as_f64(actual), as_f64(expected)) {
        return (a - b).abs() < f64::EPSILON;
    }
    display(actual) == display(expected)
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
