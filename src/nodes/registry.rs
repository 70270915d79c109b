use std::collections::HashMap;
use std::sync::Arc;

use super::NodeExecutor;

/// Registry of node executors keyed by type tag, looked up at traversal
/// time. Unregistered types are an execution-time error, not a load error.
pub struct NodeRegistry {
    executors: HashMap<String, Arc<dyn NodeExecutor>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        NodeRegistry {
            executors: HashMap::new(),
        }
    }

    pub fn register(&mut self, node_type: &str, executor: Arc<dyn NodeExecutor>) {
        self.executors.insert(node_type.to_string(), executor);
    }

    pub fn get(&self, node_type: &str) -> Option<Arc<dyn NodeExecutor>> {
        self.executors.get(node_type).cloned()
    }

    pub fn registered_types(&self) -> Vec<String> {
        self.executors.keys().cloned().collect()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        default_registry()
    }
}

/// Registry with all built-in node types registered.
pub fn default_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    registry.register("webhook", Arc::new(super::webhook::WebhookNodeExecutor));
    registry.register("memory", Arc::new(super::memory::MemoryNodeExecutor));
    registry.register("database", Arc::new(super::database::DatabaseNodeExecutor));
    registry.register("condition", Arc::new(super::condition::ConditionNodeExecutor));
    registry.register("message", Arc::new(super::message::MessageNodeExecutor));
    registry.register("transform", Arc::new(super::transform::TransformNodeExecutor));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::webhook::WebhookNodeExecutor;

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = NodeRegistry::new();
        registry.register("webhook", Arc::new(WebhookNodeExecutor));

        assert!(registry.get("webhook").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_default_registry() {
        let registry = default_registry();

        assert!(registry.get("webhook").is_some());
        assert!(registry.get("memory").is_some());
        assert!(registry.get("database").is_some());
        assert!(registry.get("condition").is_some());
        assert!(registry.get("message").is_some());
        assert!(registry.get("transform").is_some());
        assert_eq!(registry.registered_types().len(), 6);
    }
}
