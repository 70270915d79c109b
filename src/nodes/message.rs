use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::NodeError;

use super::executor::{NodeContext, NodeExecutor, NodeRunResult};

#[derive(Debug, Deserialize)]
struct MessageNodeData {
    #[serde(default)]
    text: Value,
}

/// Emits a message built from its (already resolved) `text` config. The
/// text keeps whatever the resolver produced, including verbatim
/// placeholders that did not resolve.
pub struct MessageNodeExecutor;

#[async_trait]
impl NodeExecutor for MessageNodeExecutor {
    async fn execute(
        &self,
        _node_id: &str,
        config: &Value,
        _context: &NodeContext,
    ) -> Result<NodeRunResult, NodeError> {
        let data: MessageNodeData = serde_json::from_value(config.clone())
            .map_err(|e| NodeError::ConfigError(e.to_string()))?;

        let text = match data.text {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };

        Ok(NodeRunResult::output(json!({"message": text})))
    }
}
