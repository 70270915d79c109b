use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::NodeError;

use super::executor::{NodeContext, NodeExecutor, NodeRunResult};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum MemoryOperation {
    Store,
    Recall,
}

#[derive(Debug, Deserialize)]
struct MemoryNodeData {
    #[serde(default = "default_operation")]
    operation: MemoryOperation,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

fn default_operation() -> MemoryOperation {
    MemoryOperation::Store
}

/// Keyed store/recall against the per-flow memory store.
///
/// `store` without an explicit value keeps the trigger payload, so a bare
/// memory node downstream of a webhook persists the inbound event.
pub struct MemoryNodeExecutor;

#[async_trait]
impl NodeExecutor for MemoryNodeExecutor {
    async fn execute(
        &self,
        node_id: &str,
        config: &Value,
        context: &NodeContext,
    ) -> Result<NodeRunResult, NodeError> {
        let data: MemoryNodeData = serde_json::from_value(config.clone())?;
        let key = data.key.unwrap_or_else(|| node_id.to_string());

        match data.operation {
            MemoryOperation::Store => {
                let value = data.value.unwrap_or_else(|| context.payload.clone());
                context.memory.set(&context.flow_id, &key, value.clone());
                Ok(NodeRunResult::output(
                    json!({"stored": true, "key": key, "value": value}),
                ))
            }
            MemoryOperation::Recall => {
                let value = context.memory.get(&context.flow_id, &key);
                let found = value.is_some();
                Ok(NodeRunResult::output(json!({
                    "found": found,
                    "key": key,
                    "value": value.unwrap_or(Value::Null),
                })))
            }
        }
    }
}
