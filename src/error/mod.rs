//! Error types for the flow execution engine.
//!
//! Two levels mirror the two layers of the engine: [`EngineError`] for
//! flow/graph/queue failures that terminate a job, and [`NodeError`] for
//! failures inside a single node executor.

mod engine_error;
mod node_error;

pub use engine_error::EngineError;
pub use node_error::NodeError;
