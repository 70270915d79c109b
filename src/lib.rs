//! # Hookflow — a webhook-triggered flow execution engine
//!
//! `hookflow` accepts inbound webhook calls, resolves them to a stored
//! directed graph of typed nodes, and executes the graph from the triggering
//! webhook node forward:
//!
//! - **Node execution**: webhook trigger, memory, database, condition,
//!   message and transform nodes, plus caller-registered executors.
//! - **Branching**: condition nodes select the outgoing edge whose label
//!   matches the evaluated branch; the other subtree is never visited.
//! - **Variable resolution**: `{{$nodes.<id>.output.<path>}}` and
//!   `{{$output}}` placeholders in node configs are substituted from prior
//!   node results; unresolved placeholders are left verbatim.
//! - **Durable records**: one [`Execution`] per run and one [`NodeExecution`]
//!   per visited node, queryable mid-flight and after completion.
//! - **Queueing**: a worker pool with exactly one delivery attempt per job
//!   and caller-side await-with-timeout that never cancels the job.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hookflow::{FlowEngine, WebhookRequest};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = FlowEngine::builder().build();
//!     let request = WebhookRequest::post(json!({"message": {"text": "Hello"}}));
//!     let handle = engine.trigger("my-flow", "webhook-1", request).await.unwrap();
//!     let result = handle.wait().await;
//!     println!("{:?}", result);
//! }
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod graph;
pub mod nodes;
pub mod payload;
pub mod queue;
pub mod store;
pub mod template;

pub use crate::domain::execution::{
    Execution, ExecutionStatus, NodeExecution, NodeExecutionStatus, TriggerData,
};
pub use crate::domain::flow::{Edge, FlowDefinition, Node};
pub use crate::domain::trigger::WebhookRequest;
pub use crate::engine::{EngineConfig, FlowEngine, FlowEngineBuilder};
pub use crate::error::{EngineError, NodeError};
pub use crate::graph::{build_graph, FlowGraph};
pub use crate::nodes::{NodeContext, NodeExecutor, NodeRegistry, NodeRunResult};
pub use crate::payload::{PayloadError, PayloadOptions};
pub use crate::queue::{Job, JobHandle, JobResult, JobStatus, QueueCounts};
pub use crate::store::{
    ExecutionStore, FlowStore, InMemoryExecutionStore, InMemoryFlowStore, MemoryStore, RecordStore,
};
