use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored flow: a directed graph of typed nodes. Owned by the flow
/// authoring layer; read-only to the execution engine.
///
/// Edges referencing node ids absent from `nodes` are tolerated — the
/// unreachable parts are simply never executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl FlowDefinition {
    pub fn new(id: impl Into<String>, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        FlowDefinition {
            id: id.into(),
            nodes,
            edges,
            is_active: true,
        }
    }

    /// Look up a node by id.
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }
}

/// A typed unit of work in a flow. `node_type` is an open tag; unknown
/// types fail at execution time, not at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub data: Value,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, data: Value) -> Self {
        Node {
            id: id.into(),
            node_type: node_type.into(),
            data,
        }
    }
}

/// A directed connection between two nodes. `label` (e.g. `"true"` /
/// `"false"`) selects which outgoing edge a condition node follows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Edge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }

    pub fn labeled(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Edge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: Some(label.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flow_deserializes_with_defaults() {
        let flow: FlowDefinition = serde_json::from_value(json!({
            "id": "f1",
            "nodes": [{"id": "w", "type": "webhook"}],
            "edges": []
        }))
        .unwrap();
        assert!(flow.is_active);
        assert_eq!(flow.node("w").unwrap().node_type, "webhook");
        assert!(flow.node("missing").is_none());
    }

    #[test]
    fn test_edge_label_roundtrip() {
        let edge: Edge = serde_json::from_value(json!({
            "id": "e1", "source": "c", "target": "t", "label": "true"
        }))
        .unwrap();
        assert_eq!(edge.label.as_deref(), Some("true"));
    }
}
