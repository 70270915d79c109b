use dashmap::DashMap;
use serde_json::Value;

/// Keyed value store backing the `memory` node type. Keys are namespaced
/// by flow id so flows cannot read each other's entries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, flow_id: &str, key: &str, value: Value) {
        self.entries.insert(Self::scoped(flow_id, key), value);
    }

    pub fn get(&self, flow_id: &str, key: &str) -> Option<Value> {
        self.entries
            .get(&Self::scoped(flow_id, key))
            .map(|entry| entry.clone())
    }

    fn scoped(flow_id: &str, key: &str) -> String {
        format!("{flow_id}:{key}")
    }
}
