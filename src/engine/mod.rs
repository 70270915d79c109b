//! Engine facade: configuration, builder, and the public trigger/query
//! surface consumed by the HTTP and UI layers.

mod orchestrator;

pub use orchestrator::Orchestrator;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::execution::{Execution, NodeExecution, TriggerData};
use crate::domain::trigger::WebhookRequest;
use crate::error::EngineError;
use crate::nodes::{default_registry, NodeExecutor, NodeRegistry};
use crate::payload::{self, PayloadOptions};
use crate::queue::{Job, JobHandle, JobQueue, JobResult, QueueCounts};
use crate::store::{
    ExecutionStore, FlowStore, InMemoryExecutionStore, InMemoryFlowStore, MemoryStore, RecordStore,
};

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_buffer")]
    pub queue_buffer: usize,
    /// Default timeout for [`FlowEngine::await_result`], milliseconds.
    #[serde(default = "default_result_timeout_ms")]
    pub result_timeout_ms: u64,
    /// Single-attempt delivery policy; anything other than 1 is clamped.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// How many settled job states stay addressable by job id before the
    /// oldest entries are evicted.
    #[serde(default = "default_retained_results")]
    pub retained_results: usize,
    #[serde(default)]
    pub payload: PayloadOptions,
}

fn default_workers() -> usize {
    4
}

fn default_queue_buffer() -> usize {
    256
}

fn default_result_timeout_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    1
}

fn default_retained_results() -> usize {
    1024
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            workers: default_workers(),
            queue_buffer: default_queue_buffer(),
            result_timeout_ms: default_result_timeout_ms(),
            max_attempts: default_max_attempts(),
            retained_results: default_retained_results(),
            payload: PayloadOptions::default(),
        }
    }
}

/// The webhook-triggered flow execution engine.
pub struct FlowEngine {
    config: EngineConfig,
    queue: JobQueue,
    executions: Arc<dyn ExecutionStore>,
}

impl FlowEngine {
    pub fn builder() -> FlowEngineBuilder {
        FlowEngineBuilder::new()
    }

    /// Validate and enqueue one inbound webhook call.
    ///
    /// Validation failures are returned immediately and never become an
    /// execution; everything after enqueue surfaces through the job result.
    pub async fn trigger(
        &self,
        flow_id: &str,
        webhook_node_id: &str,
        request: WebhookRequest,
    ) -> Result<JobHandle, EngineError> {
        payload::validate(&request.body, &self.config.payload)?;

        let job = Job {
            id: Uuid::new_v4().to_string(),
            flow_id: flow_id.to_string(),
            webhook_node_id: webhook_node_id.to_string(),
            payload: request.body,
            trigger: TriggerData {
                method: request.method,
                headers: request.headers,
                query_params: request.query_params,
                webhook_id: webhook_node_id.to_string(),
                timestamp: Utc::now(),
            },
            attempt: 1,
        };
        self.queue.enqueue(job).await
    }

    /// Await a job result by id with the configured default timeout.
    pub async fn await_result(&self, job_id: &str) -> Result<JobResult, EngineError> {
        self.queue
            .await_result(job_id, Duration::from_millis(self.config.result_timeout_ms))
            .await
    }

    /// Await a job result by id with an explicit timeout.
    pub async fn await_result_timeout(
        &self,
        job_id: &str,
        timeout: Duration,
    ) -> Result<JobResult, EngineError> {
        self.queue.await_result(job_id, timeout).await
    }

    /// Full execution record, including mid-flight partial executions.
    pub async fn get_flow_execution(&self, execution_id: &str) -> Option<Execution> {
        self.executions.get_execution(execution_id).await
    }

    /// Per-node records of one execution, in traversal order.
    pub async fn get_node_executions(&self, execution_id: &str) -> Option<Vec<NodeExecution>> {
        self.executions
            .get_execution(execution_id)
            .await
            .map(|execution| execution.node_executions)
    }

    /// Output of one node within one execution. `None` both for unknown
    /// executions and for nodes the traversal never reached.
    pub async fn get_node_output(&self, execution_id: &str, node_id: &str) -> Option<Value> {
        self.executions
            .get_execution(execution_id)
            .await?
            .node_execution(node_id)
            .map(|record| record.result.clone())
    }

    pub fn queue_counts(&self) -> QueueCounts {
        self.queue.counts()
    }

    /// Stop accepting new triggers and let the workers drain the queue.
    /// Jobs enqueued beforehand still run to completion; their handles
    /// settle as usual. Returns the final queue counts, zero once drained.
    pub async fn shutdown(self) -> QueueCounts {
        self.queue.shutdown().await
    }
}

/// Builder wiring stores, registry and queue into a [`FlowEngine`].
pub struct FlowEngineBuilder {
    config: EngineConfig,
    flows: Option<Arc<dyn FlowStore>>,
    executions: Option<Arc<dyn ExecutionStore>>,
    registry: NodeRegistry,
}

impl FlowEngineBuilder {
    fn new() -> Self {
        FlowEngineBuilder {
            config: EngineConfig::default(),
            flows: None,
            executions: None,
            registry: default_registry(),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn payload_options(mut self, options: PayloadOptions) -> Self {
        self.config.payload = options;
        self
    }

    pub fn flow_store(mut self, flows: Arc<dyn FlowStore>) -> Self {
        self.flows = Some(flows);
        self
    }

    pub fn execution_store(mut self, executions: Arc<dyn ExecutionStore>) -> Self {
        self.executions = Some(executions);
        self
    }

    /// Register an additional node executor before the engine starts.
    pub fn register_node(mut self, node_type: &str, executor: Arc<dyn NodeExecutor>) -> Self {
        self.registry.register(node_type, executor);
        self
    }

    pub fn build(self) -> FlowEngine {
        let mut config = self.config;
        // Delivery is single-attempt; clamp whatever the config says.
        config.max_attempts = 1;

        let flows = self
            .flows
            .unwrap_or_else(|| Arc::new(InMemoryFlowStore::new()));
        let executions: Arc<dyn ExecutionStore> = self
            .executions
            .unwrap_or_else(|| Arc::new(InMemoryExecutionStore::new()));
        let orchestrator = Arc::new(Orchestrator::new(
            flows,
            Arc::clone(&executions),
            Arc::new(self.registry),
            Arc::new(MemoryStore::new()),
            Arc::new(RecordStore::new()),
        ));
        let queue = JobQueue::start(
            config.workers,
            config.queue_buffer,
            config.retained_results,
            orchestrator,
        );

        FlowEngine {
            config,
            queue,
            executions,
        }
    }
}
