//! Node executors: pluggable per-type handlers looked up by type tag.

pub mod condition;
pub mod database;
pub mod executor;
pub mod memory;
pub mod message;
pub mod registry;
pub mod transform;
pub mod webhook;

pub use executor::{NodeContext, NodeExecutor, NodeRunResult};
pub use registry::{default_registry, NodeRegistry};
