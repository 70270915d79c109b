//! Graph construction and traversal over stored flow definitions.

pub mod builder;
pub mod traversal;

pub use builder::{build_graph, FlowGraph, GraphNode};
pub use traversal::{reachable_order, Traversal};
