//! Per-job orchestration: load graph, traverse, resolve, execute, record.
//!
//! The execution shell is created before the flow is loaded, so a
//! `FlowNotFound` result still carries a defined execution id and the
//! failure is queryable afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::execution::{Execution, ExecutionStatus, NodeExecution, NodeExecutionStatus};
use crate::error::EngineError;
use crate::graph::{build_graph, Traversal};
use crate::nodes::{NodeContext, NodeRegistry};
use crate::queue::{Job, JobResult, JobRunner};
use crate::store::{ExecutionStore, FlowStore, MemoryStore, RecordStore};
use crate::template::{resolve_config, ResolveContext};

pub struct Orchestrator {
    flows: Arc<dyn FlowStore>,
    executions: Arc<dyn ExecutionStore>,
    registry: Arc<NodeRegistry>,
    memory: Arc<MemoryStore>,
    records: Arc<RecordStore>,
}

impl Orchestrator {
    pub fn new(
        flows: Arc<dyn FlowStore>,
        executions: Arc<dyn ExecutionStore>,
        registry: Arc<NodeRegistry>,
        memory: Arc<MemoryStore>,
        records: Arc<RecordStore>,
    ) -> Self {
        Orchestrator {
            flows,
            executions,
            registry,
            memory,
            records,
        }
    }

    /// Run one job to a terminal execution state and a job result.
    /// Graph- and node-level failures become `status: error` results here;
    /// they never propagate to the queue layer.
    pub async fn run_job(&self, job: Job) -> JobResult {
        let execution_id = Uuid::new_v4().to_string();
        let start_time = Utc::now();

        self.executions
            .create_execution(Execution {
                id: execution_id.clone(),
                flow_id: job.flow_id.clone(),
                status: ExecutionStatus::Pending,
                trigger_type: "webhook".to_string(),
                data: job.payload.clone(),
                trigger_data: Some(job.trigger.clone()),
                error: None,
                start_time,
                end_time: None,
                duration_ms: None,
                node_executions: Vec::new(),
            })
            .await;
        self.executions.mark_running(&execution_id).await;

        tracing::info!(
            execution_id = %execution_id,
            flow_id = %job.flow_id,
            webhook_node_id = %job.webhook_node_id,
            "execution started"
        );

        match self.execute_flow(&job, &execution_id).await {
            Ok(()) => {
                self.executions
                    .finalize_execution(&execution_id, ExecutionStatus::Success, None)
                    .await;
                let duration_ms = (Utc::now() - start_time).num_milliseconds();
                tracing::info!(execution_id = %execution_id, duration_ms, "execution succeeded");
                JobResult::success(execution_id, duration_ms, job.attempt)
            }
            Err(error) => {
                let message = error.to_string();
                self.executions
                    .finalize_execution(&execution_id, ExecutionStatus::Error, Some(message.clone()))
                    .await;
                tracing::warn!(execution_id = %execution_id, error = %message, "execution failed");
                JobResult::error(Some(execution_id), message, job.attempt)
            }
        }
    }

    async fn execute_flow(&self, job: &Job, execution_id: &str) -> Result<(), EngineError> {
        let flow = self
            .flows
            .get_flow(&job.flow_id)
            .await
            .ok_or_else(|| EngineError::FlowNotFound(job.flow_id.clone()))?;
        if !flow.is_active {
            return Err(EngineError::FlowInactive(flow.id));
        }

        let graph = build_graph(&flow);
        let mut traversal = Traversal::new(&graph, &job.webhook_node_id)?;

        let context = NodeContext::new(
            execution_id,
            &job.flow_id,
            job.payload.clone(),
            Arc::clone(&self.memory),
            Arc::clone(&self.records),
        );

        // One accumulator per job: outputs of finished nodes, fed to the
        // resolver for every later node in this execution.
        let mut outputs: HashMap<String, Value> = HashMap::new();
        let mut last_output: Option<Value> = None;

        while let Some(node_id) = traversal.next_node() {
            let node = graph
                .node(&node_id)
                .ok_or_else(|| EngineError::InternalError(format!("node vanished: {node_id}")))?;

            let resolved = resolve_config(
                &node.config,
                &ResolveContext {
                    node_results: &outputs,
                    last_output: last_output.as_ref(),
                },
            );

            let executor = self
                .registry
                .get(&node.node_type)
                .ok_or_else(|| EngineError::NodeTypeNotSupported(node.node_type.clone()))?;

            let node_start = Utc::now();
            tracing::debug!(execution_id, node_id = %node_id, node_type = %node.node_type, "node started");

            match executor.execute(&node_id, &resolved, &context).await {
                Ok(run) => {
                    self.executions
                        .append_node_execution(
                            execution_id,
                            NodeExecution {
                                node_id: node_id.clone(),
                                status: NodeExecutionStatus::Completed,
                                data: resolved,
                                result: run.output.clone(),
                                error: None,
                                start_time: node_start,
                                end_time: Utc::now(),
                            },
                        )
                        .await;

                    traversal.advance(&node_id, run.branch.as_deref());
                    outputs.insert(node_id, run.output.clone());
                    last_output = Some(run.output);
                }
                Err(node_error) => {
                    let message = node_error.to_string();
                    self.executions
                        .append_node_execution(
                            execution_id,
                            NodeExecution {
                                node_id: node_id.clone(),
                                status: NodeExecutionStatus::Error,
                                data: resolved,
                                result: Value::Null,
                                error: Some(message.clone()),
                                start_time: node_start,
                                end_time: Utc::now(),
                            },
                        )
                        .await;

                    // First error wins; the rest of the traversal is
                    // abandoned, prior records stay persisted.
                    return Err(EngineError::NodeExecutionFailed {
                        node_id,
                        error: message,
                    });
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl JobRunner for Orchestrator {
    async fn run(&self, job: Job) -> JobResult {
        self.run_job(job).await
    }
}
