use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::flow::FlowDefinition;

/// Read access to stored flow definitions.
#[async_trait]
pub trait FlowStore: Send + Sync {
    async fn get_flow(&self, flow_id: &str) -> Option<FlowDefinition>;
}

/// In-memory flow store used by the default engine build and by tests.
#[derive(Debug, Default)]
pub struct InMemoryFlowStore {
    flows: DashMap<String, FlowDefinition>,
}

impl InMemoryFlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, flow: FlowDefinition) {
        self.flows.insert(flow.id.clone(), flow);
    }

    pub fn remove(&self, flow_id: &str) {
        self.flows.remove(flow_id);
    }
}

#[async_trait]
impl FlowStore for InMemoryFlowStore {
    async fn get_flow(&self, flow_id: &str) -> Option<FlowDefinition> {
        self.flows.get(flow_id).map(|entry| entry.clone())
    }
}
