//! Execution records — the canonical definition of per-run state.
//!
//! One [`Execution`] is created per triggered job; one [`NodeExecution`] is
//! appended per node actually visited, in traversal order. Unreached nodes
//! have no entry at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Terminal and intermediate states of one flow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Success,
    Error,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Error)
    }
}

/// Outcome of one node within one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeExecutionStatus {
    Completed,
    Error,
}

/// The recorded result of one node having run within one execution.
/// Finalized atomically per node; never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeExecution {
    pub node_id: String,
    pub status: NodeExecutionStatus,
    /// The node's resolved configuration at execution time.
    pub data: Value,
    /// The node's output, referenced by later nodes as
    /// `{{$nodes.<id>.output...}}`.
    pub result: Value,
    #[serde(default)]
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Trigger metadata stored verbatim on the execution (case preserved).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerData {
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub query_params: HashMap<String, String>,
    pub webhook_id: String,
    pub timestamp: DateTime<Utc>,
}

/// One run of a flow triggered by one inbound event.
///
/// Status transitions `pending -> running -> success | error`; terminal
/// records are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: String,
    pub flow_id: String,
    pub status: ExecutionStatus,
    pub trigger_type: String,
    /// The inbound webhook payload.
    pub data: Value,
    pub trigger_data: Option<TriggerData>,
    #[serde(default)]
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    /// Visited nodes in traversal order.
    #[serde(default)]
    pub node_executions: Vec<NodeExecution>,
}

impl Execution {
    /// Look up the record of one node within this execution. Returns `None`
    /// for nodes the traversal never reached.
    pub fn node_execution(&self, node_id: &str) -> Option<&NodeExecution> {
        self.node_executions.iter().find(|n| n.node_id == node_id)
    }
}
