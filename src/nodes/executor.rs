use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::NodeError;
use crate::store::{MemoryStore, RecordStore};

/// Result of one node execution.
#[derive(Debug, Clone)]
pub struct NodeRunResult {
    /// The node's output, referenced downstream via `{{$nodes...}}`.
    pub output: Value,
    /// Branch label a condition node selected; `None` follows all edges.
    pub branch: Option<String>,
}

impl NodeRunResult {
    pub fn output(output: Value) -> Self {
        NodeRunResult {
            output,
            branch: None,
        }
    }

    pub fn with_branch(output: Value, branch: impl Into<String>) -> Self {
        NodeRunResult {
            output,
            branch: Some(branch.into()),
        }
    }
}

/// Per-job context shared by all executors of one execution.
#[derive(Clone)]
pub struct NodeContext {
    pub execution_id: String,
    pub flow_id: String,
    /// The validated inbound webhook payload.
    pub payload: Value,
    pub memory: Arc<MemoryStore>,
    pub records: Arc<RecordStore>,
}

impl NodeContext {
    pub fn new(
        execution_id: impl Into<String>,
        flow_id: impl Into<String>,
        payload: Value,
        memory: Arc<MemoryStore>,
        records: Arc<RecordStore>,
    ) -> Self {
        NodeContext {
            execution_id: execution_id.into(),
            flow_id: flow_id.into(),
            payload,
            memory,
            records,
        }
    }
}

/// Trait for node execution. Each node type implements this.
///
/// `config` arrives with all variable placeholders already resolved against
/// the outputs accumulated so far in the execution.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    async fn execute(
        &self,
        node_id: &str,
        config: &Value,
        context: &NodeContext,
    ) -> Result<NodeRunResult, NodeError>;
}

#[cfg(test)]
pub(crate) fn test_context(payload: Value) -> NodeContext {
    NodeContext::new(
        "exec-test",
        "flow-test",
        payload,
        Arc::new(MemoryStore::new()),
        Arc::new(RecordStore::new()),
    )
}
