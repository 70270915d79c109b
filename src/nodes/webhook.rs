use async_trait::async_trait;
use serde_json::Value;

use crate::error::NodeError;

use super::executor::{NodeContext, NodeExecutor, NodeRunResult};

/// The flow entry point. Emits the validated inbound payload as its
/// output, making it addressable as `{{$nodes.<webhook-id>.output...}}`.
pub struct WebhookNodeExecutor;

#[async_trait]
impl NodeExecutor for WebhookNodeExecutor {
    async fn execute(
        &self,
        _node_id: &str,
        _config: &Value,
        context: &NodeContext,
    ) -> Result<NodeRunResult, NodeError> {
        Ok(NodeRunResult::output(context.payload.clone()))
    }
}
