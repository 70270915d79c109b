//! Shared fixtures for the scenario tests.
#![allow(dead_code)]

use std::sync::Arc;

use hookflow::{Edge, FlowDefinition, FlowEngine, InMemoryFlowStore, Node};
use serde_json::json;

/// Engine backed by an in-memory flow store preloaded with `flows`.
pub fn engine_with_flows(flows: Vec<FlowDefinition>) -> FlowEngine {
    let store = Arc::new(InMemoryFlowStore::new());
    for flow in flows {
        store.insert(flow);
    }
    FlowEngine::builder().flow_store(store).build()
}

/// `[webhook W] -> [memory M]`
pub fn webhook_memory_flow(id: &str) -> FlowDefinition {
    FlowDefinition::new(
        id,
        vec![
            Node::new("W", "webhook", json!({})),
            Node::new("M", "memory", json!({})),
        ],
        vec![Edge::new("e1", "W", "M")],
    )
}

/// `[webhook W] -> [condition C] -> true:[memory T], false:[memory F]`
///
/// The condition checks `approved == "true"` on the trigger payload.
pub fn condition_flow(id: &str) -> FlowDefinition {
    FlowDefinition::new(
        id,
        vec![
            Node::new("W", "webhook", json!({})),
            Node::new("C", "condition", json!({"field": "approved", "value": "true"})),
            Node::new("T", "memory", json!({})),
            Node::new("F", "memory", json!({})),
        ],
        vec![
            Edge::new("e1", "W", "C"),
            Edge::labeled("e2", "C", "T", "true"),
            Edge::labeled("e3", "C", "F", "false"),
        ],
    )
}
