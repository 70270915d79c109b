//! Domain model: stored flow definitions, trigger metadata, and the
//! execution records the engine persists per run.

pub mod execution;
pub mod flow;
pub mod trigger;
