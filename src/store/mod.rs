//! Collaborator storage interfaces and their in-memory implementations.
//!
//! The engine only depends on the traits; the in-memory variants back the
//! default engine build and the test suite.

mod execution_store;
mod flow_store;
mod memory_store;
mod record_store;

pub use execution_store::{ExecutionStore, InMemoryExecutionStore};
pub use flow_store::{FlowStore, InMemoryFlowStore};
pub use memory_store::MemoryStore;
pub use record_store::{RecordStore, StoredRecord};
