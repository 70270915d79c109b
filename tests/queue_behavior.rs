//! Queue-level properties: isolation under concurrency, single-attempt
//! delivery, caller-timeout decoupling, and drain-to-zero accounting.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{engine_with_flows, webhook_memory_flow};
use hookflow::{
    Edge, EngineError, FlowDefinition, FlowEngine, InMemoryFlowStore, Node, NodeContext,
    NodeError, NodeExecutor, NodeRunResult, WebhookRequest,
};
use serde_json::{json, Value};

#[tokio::test]
async fn fifty_concurrent_jobs_get_unique_execution_ids() {
    let engine = Arc::new(engine_with_flows(vec![webhook_memory_flow("flow-1")]));

    let mut handles = Vec::new();
    for i in 0..50 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine
                .trigger("flow-1", "W", WebhookRequest::post(json!({"seq": i})))
                .await
                .unwrap()
                .wait()
                .await
        }));
    }

    let mut execution_ids = HashSet::new();
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_success());
        execution_ids.insert(result.execution_id.unwrap());
    }
    assert_eq!(execution_ids.len(), 50);

    let counts = engine.queue_counts();
    assert_eq!((counts.waiting, counts.active), (0, 0));
}

#[tokio::test]
async fn concurrent_executions_do_not_cross_contaminate() {
    let engine = Arc::new(engine_with_flows(vec![webhook_memory_flow("flow-1")]));

    let mut handles = Vec::new();
    for i in 0..20 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let result = engine
                .trigger("flow-1", "W", WebhookRequest::post(json!({"seq": i})))
                .await
                .unwrap()
                .wait()
                .await;
            (i, result)
        }));
    }

    for handle in handles {
        let (i, result) = handle.await.unwrap();
        let execution = engine
            .get_flow_execution(&result.execution_id.unwrap())
            .await
            .unwrap();
        assert_eq!(execution.data, json!({"seq": i}));
    }
}

#[tokio::test]
async fn failed_job_reports_single_attempt() {
    let engine = engine_with_flows(vec![]);
    let result = engine
        .trigger("missing-flow", "W", WebhookRequest::post(json!({})))
        .await
        .unwrap()
        .wait()
        .await;

    assert!(result.error);
    assert!(result.attempts_made <= 1);
}

#[tokio::test]
async fn failing_job_does_not_block_unrelated_jobs() {
    let engine = Arc::new(engine_with_flows(vec![webhook_memory_flow("flow-ok")]));

    let mut handles = Vec::new();
    for i in 0..10 {
        let engine = Arc::clone(&engine);
        let flow_id = if i % 2 == 0 { "flow-ok" } else { "flow-broken" };
        handles.push(tokio::spawn(async move {
            engine
                .trigger(flow_id, "W", WebhookRequest::post(json!({"seq": i})))
                .await
                .unwrap()
                .wait()
                .await
        }));
    }

    let results: Vec<_> = {
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    };
    assert_eq!(results.iter().filter(|r| r.is_success()).count(), 5);
    assert_eq!(results.iter().filter(|r| r.error).count(), 5);
}

struct SlowExecutor(Duration);

#[async_trait]
impl NodeExecutor for SlowExecutor {
    async fn execute(
        &self,
        _node_id: &str,
        _config: &Value,
        _context: &NodeContext,
    ) -> Result<NodeRunResult, NodeError> {
        tokio::time::sleep(self.0).await;
        Ok(NodeRunResult::output(json!({"slow": true})))
    }
}

fn slow_flow_engine() -> FlowEngine {
    let flow = FlowDefinition::new(
        "flow-slow",
        vec![
            Node::new("W", "webhook", json!({})),
            Node::new("S", "slow", json!({})),
        ],
        vec![Edge::new("e1", "W", "S")],
    );
    let store = Arc::new(InMemoryFlowStore::new());
    store.insert(flow);
    FlowEngine::builder()
        .flow_store(store)
        .register_node("slow", Arc::new(SlowExecutor(Duration::from_millis(200))))
        .build()
}

#[tokio::test]
async fn await_timeout_is_distinct_and_does_not_cancel_the_job() {
    let engine = slow_flow_engine();
    let handle = engine
        .trigger("flow-slow", "W", WebhookRequest::post(json!({})))
        .await
        .unwrap();

    let err = engine
        .await_result_timeout(&handle.job_id, Duration::from_millis(10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ResultTimeout));

    // The job kept running in the background and still settles.
    let result = handle.wait().await;
    assert!(result.is_success());
    let execution = engine
        .get_flow_execution(&result.execution_id.unwrap())
        .await
        .unwrap();
    assert!(execution.node_execution("S").is_some());

    // The settled result is still queryable by job id after the timeout.
    let late = engine
        .await_result_timeout(&handle.job_id, Duration::from_secs(2))
        .await
        .unwrap();
    assert!(late.is_success());
}

#[tokio::test]
async fn shutdown_drains_enqueued_jobs_to_zero() {
    let engine = engine_with_flows(vec![webhook_memory_flow("flow-1")]);

    let mut handles = Vec::new();
    for i in 0..10 {
        handles.push(
            engine
                .trigger("flow-1", "W", WebhookRequest::post(json!({"seq": i})))
                .await
                .unwrap(),
        );
    }

    let counts = engine.shutdown().await;
    assert_eq!((counts.waiting, counts.active), (0, 0));

    // Everything enqueued before the shutdown still ran to completion.
    for handle in handles {
        assert!(handle.wait().await.is_success());
    }
}

#[tokio::test]
async fn node_records_land_in_traversal_order() {
    let engine = slow_flow_engine();
    let result = engine
        .trigger("flow-slow", "W", WebhookRequest::post(json!({})))
        .await
        .unwrap()
        .wait()
        .await;

    let execution = engine
        .get_flow_execution(&result.execution_id.unwrap())
        .await
        .unwrap();
    assert_eq!(execution.node_executions[0].node_id, "W");
    assert_eq!(execution.node_executions[1].node_id, "S");
    assert!(execution.node_executions[0].end_time <= execution.node_executions[1].start_time);
}
