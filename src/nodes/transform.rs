use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::NodeError;

use super::executor::{NodeContext, NodeExecutor, NodeRunResult};

#[derive(Debug, Deserialize)]
struct TransformNodeData {
    /// Output field name to (already resolved) value. The resolver has run
    /// over the whole config, so mapping values may come from any prior
    /// node's output.
    #[serde(default)]
    mappings: Map<String, Value>,
}

/// Shapes a new output object from resolved mappings.
pub struct TransformNodeExecutor;

#[async_trait]
impl NodeExecutor for TransformNodeExecutor {
    async fn execute(
        &self,
        _node_id: &str,
        config: &Value,
        _context: &NodeContext,
    ) -> Result<NodeRunResult, NodeError> {
        let data: TransformNodeData = serde_json::from_value(config.clone())
            .map_err(|e| NodeError::ConfigError(e.to_string()))?;

        Ok(NodeRunResult::output(Value::Object(data.mappings)))
    }
}
