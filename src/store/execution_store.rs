//! The execution recorder: durable per-run and per-node records.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use crate::domain::execution::{Execution, ExecutionStatus, NodeExecution};

/// Write and read access to execution records.
///
/// Each execution is exclusively written by the one orchestrator instance
/// processing its job; per-node appends land as each node finishes, so
/// partial executions remain queryable mid-flight.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn create_execution(&self, execution: Execution);
    async fn mark_running(&self, execution_id: &str);
    async fn append_node_execution(&self, execution_id: &str, record: NodeExecution);
    /// Apply the terminal status. End time and duration are derived from
    /// the stored start time. No further writes follow a finalize.
    async fn finalize_execution(
        &self,
        execution_id: &str,
        status: ExecutionStatus,
        error: Option<String>,
    );
    async fn get_execution(&self, execution_id: &str) -> Option<Execution>;
}

/// In-memory execution store used by the default engine build and tests.
#[derive(Debug, Default)]
pub struct InMemoryExecutionStore {
    executions: DashMap<String, Execution>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn create_execution(&self, execution: Execution) {
        self.executions.insert(execution.id.clone(), execution);
    }

    async fn mark_running(&self, execution_id: &str) {
        if let Some(mut execution) = self.executions.get_mut(execution_id) {
            if !execution.status.is_terminal() {
                execution.status = ExecutionStatus::Running;
            }
        }
    }

    async fn append_node_execution(&self, execution_id: &str, record: NodeExecution) {
        if let Some(mut execution) = self.executions.get_mut(execution_id) {
            execution.node_executions.push(record);
        }
    }

    async fn finalize_execution(
        &self,
        execution_id: &str,
        status: ExecutionStatus,
        error: Option<String>,
    ) {
        if let Some(mut execution) = self.executions.get_mut(execution_id) {
            if execution.status.is_terminal() {
                return;
            }
            let end_time = Utc::now();
            execution.status = status;
            execution.error = error;
            execution.end_time = Some(end_time);
            execution.duration_ms = Some((end_time - execution.start_time).num_milliseconds());
        }
    }

    async fn get_execution(&self, execution_id: &str) -> Option<Execution> {
        self.executions.get(execution_id).map(|entry| entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::NodeExecutionStatus;
    use serde_json::json;

    fn execution(id: &str) -> Execution {
        Execution {
            id: id.to_string(),
            flow_id: "f1".to_string(),
            status: ExecutionStatus::Pending,
            trigger_type: "webhook".to_string(),
            data: json!({"a": 1}),
            trigger_data: None,
            error: None,
            start_time: Utc::now(),
            end_time: None,
            duration_ms: None,
            node_executions: Vec::new(),
        }
    }

    fn node_record(node_id: &str) -> NodeExecution {
        let now = Utc::now();
        NodeExecution {
            node_id: node_id.to_string(),
            status: NodeExecutionStatus::Completed,
            data: json!({}),
            result: json!({"ok": true}),
            error: None,
            start_time: now,
            end_time: now,
        }
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let store = InMemoryExecutionStore::new();
        store.create_execution(execution("e1")).await;
        store.mark_running("e1").await;
        store.append_node_execution("e1", node_record("w")).await;
        store
            .finalize_execution("e1", ExecutionStatus::Success, None)
            .await;

        let stored = store.get_execution("e1").await.unwrap();
        assert_eq!(stored.status, ExecutionStatus::Success);
        assert_eq!(stored.node_executions.len(), 1);
        assert!(stored.end_time.is_some());
        assert!(stored.duration_ms.is_some());
    }

    #[tokio::test]
    async fn test_finalize_is_idempotent() {
        let store = InMemoryExecutionStore::new();
        store.create_execution(execution("e1")).await;
        store
            .finalize_execution("e1", ExecutionStatus::Error, Some("boom".into()))
            .await;
        store
            .finalize_execution("e1", ExecutionStatus::Success, None)
            .await;

        let stored = store.get_execution("e1").await.unwrap();
        assert_eq!(stored.status, ExecutionStatus::Error);
        assert_eq!(stored.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_partial_execution_is_readable_before_finalize() {
        let store = InMemoryExecutionStore::new();
        store.create_execution(execution("e1")).await;
        store.mark_running("e1").await;
        store.append_node_execution("e1", node_record("w")).await;

        let stored = store.get_execution("e1").await.unwrap();
        assert_eq!(stored.status, ExecutionStatus::Running);
        assert_eq!(
            stored.node_execution("w").unwrap().result,
            json!({"ok": true})
        );
        assert!(stored.node_execution("unreached").is_none());
    }
}
