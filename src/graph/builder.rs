use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use serde_json::Value;

use crate::domain::flow::FlowDefinition;

/// A node as carried in the execution graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: String,
    pub node_type: String,
    /// The node's raw configuration (`data` in the stored flow).
    pub config: Value,
}

/// An edge as carried in the execution graph.
#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub id: String,
    pub label: Option<String>,
}

/// Node ID to petgraph NodeIndex mapping.
pub type NodeIndexMap = HashMap<String, NodeIndex>;

/// Immutable graph view of one flow definition.
#[derive(Debug)]
pub struct FlowGraph {
    graph: StableDiGraph<GraphNode, GraphEdge>,
    node_index_map: NodeIndexMap,
}

impl FlowGraph {
    /// Look up a graph node by flow node id.
    pub fn node(&self, node_id: &str) -> Option<&GraphNode> {
        let idx = self.node_index_map.get(node_id)?;
        self.graph.node_weight(*idx)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.node_index_map.contains_key(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Successor node ids reachable from `node_id`.
    ///
    /// With `branch = None` every outgoing edge is followed; with
    /// `branch = Some(label)` only edges carrying exactly that label are
    /// followed. Condition nodes use the latter, so the non-matching
    /// subtree is never produced.
    pub fn successors(&self, node_id: &str, branch: Option<&str>) -> Vec<String> {
        let Some(idx) = self.node_index_map.get(node_id) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(*idx, petgraph::Direction::Outgoing)
            .filter(|edge| match branch {
                None => true,
                Some(label) => edge.weight().label.as_deref() == Some(label),
            })
            .filter_map(|edge| self.graph.node_weight(edge.target()).map(|n| n.id.clone()))
            .collect()
    }
}

/// Build the execution graph for a stored flow.
///
/// Edges whose source or target does not resolve to a stored node are
/// skipped rather than rejected; such definitions are tolerated and the
/// dangling parts simply never execute.
pub fn build_graph(flow: &FlowDefinition) -> FlowGraph {
    let mut graph = StableDiGraph::<GraphNode, GraphEdge>::new();
    let mut node_index_map: NodeIndexMap = HashMap::new();

    for node in &flow.nodes {
        let idx = graph.add_node(GraphNode {
            id: node.id.clone(),
            node_type: node.node_type.clone(),
            config: node.data.clone(),
        });
        node_index_map.insert(node.id.clone(), idx);
    }

    for edge in &flow.edges {
        let (Some(source_idx), Some(target_idx)) = (
            node_index_map.get(&edge.source),
            node_index_map.get(&edge.target),
        ) else {
            tracing::debug!(
                flow_id = %flow.id,
                edge_id = %edge.id,
                "skipping edge with unresolved endpoint"
            );
            continue;
        };

        graph.add_edge(
            *source_idx,
            *target_idx,
            GraphEdge {
                id: edge.id.clone(),
                label: edge.label.clone(),
            },
        );
    }

    FlowGraph {
        graph,
        node_index_map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow::{Edge, Node};
    use serde_json::json;

    fn simple_flow() -> FlowDefinition {
        FlowDefinition::new(
            "f1",
            vec![
                Node::new("w", "webhook", json!({})),
                Node::new("m", "memory", json!({})),
            ],
            vec![Edge::new("e1", "w", "m")],
        )
    }

    #[test]
    fn test_build_simple_graph() {
        let graph = build_graph(&simple_flow());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node("w").unwrap().node_type, "webhook");
        assert_eq!(graph.successors("w", None), vec!["m"]);
        assert!(graph.successors("m", None).is_empty());
    }

    #[test]
    fn test_dangling_edges_are_skipped() {
        let mut flow = simple_flow();
        flow.edges.push(Edge::new("e2", "m", "ghost"));
        flow.edges.push(Edge::new("e3", "phantom", "w"));

        let graph = build_graph(&flow);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.successors("m", None).is_empty());
    }

    #[test]
    fn test_labeled_successor_selection() {
        let flow = FlowDefinition::new(
            "f2",
            vec![
                Node::new("c", "condition", json!({})),
                Node::new("t", "memory", json!({})),
                Node::new("f", "memory", json!({})),
            ],
            vec![
                Edge::labeled("e1", "c", "t", "true"),
                Edge::labeled("e2", "c", "f", "false"),
            ],
        );

        let graph = build_graph(&flow);
        assert_eq!(graph.successors("c", Some("true")), vec!["t"]);
        assert_eq!(graph.successors("c", Some("false")), vec!["f"]);
        assert!(graph.successors("c", Some("maybe")).is_empty());
        assert_eq!(graph.successors("c", None).len(), 2);
    }
}
