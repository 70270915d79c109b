//! Branch-aware breadth-first traversal rooted at the trigger node.
//!
//! Condition branches are only known after the condition node has run, so
//! the frontier advances incrementally: the orchestrator pops the next node,
//! executes it, and reports back which branch (if any) was taken.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::EngineError;

use super::builder::FlowGraph;

/// Incremental breadth-first frontier over one flow graph.
pub struct Traversal<'g> {
    graph: &'g FlowGraph,
    queue: VecDeque<String>,
    visited: HashSet<String>,
}

impl<'g> Traversal<'g> {
    /// Start a traversal at the webhook node that received the call.
    pub fn new(graph: &'g FlowGraph, trigger_node_id: &str) -> Result<Self, EngineError> {
        if !graph.contains(trigger_node_id) {
            return Err(EngineError::WebhookNodeNotFound(trigger_node_id.to_string()));
        }

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        queue.push_back(trigger_node_id.to_string());
        visited.insert(trigger_node_id.to_string());

        Ok(Traversal {
            graph,
            queue,
            visited,
        })
    }

    /// Pop the next node to execute, if any.
    pub fn next_node(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Report that `node_id` finished, enqueueing its successors.
    ///
    /// `branch` carries the label a condition node selected; `None` follows
    /// every outgoing edge. Nodes already visited in this traversal are not
    /// enqueued again.
    pub fn advance(&mut self, node_id: &str, branch: Option<&str>) {
        for successor in self.graph.successors(node_id, branch) {
            if self.visited.insert(successor.clone()) {
                self.queue.push_back(successor);
            }
        }
    }
}

/// The full reachable execution order given pre-decided condition branches.
///
/// `decisions` maps a condition node id to the branch label it takes; nodes
/// missing from the map follow all outgoing edges.
pub fn reachable_order(
    graph: &FlowGraph,
    trigger_node_id: &str,
    decisions: &HashMap<String, String>,
) -> Result<Vec<String>, EngineError> {
    let mut traversal = Traversal::new(graph, trigger_node_id)?;
    let mut order = Vec::new();

    while let Some(node_id) = traversal.next_node() {
        traversal.advance(&node_id, decisions.get(&node_id).map(String::as_str));
        order.push(node_id);
    }

    Ok(order)
}
