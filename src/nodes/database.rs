use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::NodeError;

use super::executor::{NodeContext, NodeExecutor, NodeRunResult};

#[derive(Debug, Deserialize)]
struct DatabaseNodeData {
    operation: String,
    table: String,
    #[serde(default)]
    record: Value,
    #[serde(default)]
    filter: Value,
    #[serde(default)]
    id: Option<String>,
}

/// CRUD against the record store. The operation tag is validated at
/// execution time; anything outside insert/find/update/delete fails the
/// node.
pub struct DatabaseNodeExecutor;

#[async_trait]
impl NodeExecutor for DatabaseNodeExecutor {
    async fn execute(
        &self,
        _node_id: &str,
        config: &Value,
        context: &NodeContext,
    ) -> Result<NodeRunResult, NodeError> {
        let data: DatabaseNodeData = serde_json::from_value(config.clone())
            .map_err(|e| NodeError::ConfigError(e.to_string()))?;

        let output = match data.operation.as_str() {
            "insert" => {
                let id = context.records.insert(&data.table, data.record.clone());
                json!({"id": id, "record": data.record})
            }
            "find" => {
                let found = context.records.find(&data.table, &data.filter);
                let records: Vec<Value> = found
                    .into_iter()
                    .map(|r| json!({"id": r.id, "record": r.data}))
                    .collect();
                json!({"count": records.len(), "records": records})
            }
            "update" => {
                let id = data
                    .id
                    .ok_or_else(|| NodeError::ConfigError("update requires an id".to_string()))?;
                let updated = context.records.update(&data.table, &id, &data.record);
                match updated {
                    Some(record) => json!({"id": record.id, "record": record.data, "updated": true}),
                    None => json!({"id": id, "updated": false}),
                }
            }
            "delete" => {
                let id = data
                    .id
                    .ok_or_else(|| NodeError::ConfigError("delete requires an id".to_string()))?;
                let deleted = context.records.delete(&data.table, &id);
                json!({"id": id, "deleted": deleted})
            }
            other => return Err(NodeError::UnsupportedOperation(other.to_string())),
        };

        Ok(NodeRunResult::output(output))
    }
}
