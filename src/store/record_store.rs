//! Record storage backing the `database` node type.
//!
//! Treated as a key-value/record store behind a plain CRUD interface; the
//! storage engine behind it is out of scope for the execution engine.

use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

/// A stored record with its generated id.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: String,
    pub data: Value,
}

/// In-memory table store with subset-match filtering.
#[derive(Debug, Default)]
pub struct RecordStore {
    tables: DashMap<String, RwLock<Vec<StoredRecord>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning its generated id.
    pub fn insert(&self, table: &str, data: Value) -> String {
        let id = Uuid::new_v4().to_string();
        let record = StoredRecord {
            id: id.clone(),
            data,
        };
        self.tables
            .entry(table.to_string())
            .or_default()
            .write()
            .push(record);
        id
    }

    /// All records whose data contains every field of `filter` with an
    /// equal value. An empty or non-object filter matches everything.
    pub fn find(&self, table: &str, filter: &Value) -> Vec<StoredRecord> {
        let Some(rows) = self.tables.get(table) else {
            return Vec::new();
        };
        let matches = rows
            .read()
            .iter()
            .filter(|record| matches_filter(&record.data, filter))
            .cloned()
            .collect();
        matches
    }

    /// Merge `patch` object fields into the record, returning the updated
    /// record if it exists.
    pub fn update(&self, table: &str, id: &str, patch: &Value) -> Option<StoredRecord> {
        let rows = self.tables.get(table)?;
        let mut rows = rows.write();
        let record = rows.iter_mut().find(|r| r.id == id)?;
        if let (Value::Object(data), Value::Object(patch)) = (&mut record.data, patch) {
            for (k, v) in patch {
                data.insert(k.clone(), v.clone());
            }
        } else {
            record.data = patch.clone();
        }
        Some(record.clone())
    }

    /// Remove the record, returning whether it existed.
    pub fn delete(&self, table: &str, id: &str) -> bool {
        let Some(rows) = self.tables.get(table) else {
            return false;
        };
        let mut rows = rows.write();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        rows.len() != before
    }
}

fn matches_filter(data: &Value, filter: &Value) -> bool {
    match filter {
        Value::Object(fields) if !fields.is_empty() => fields.iter().all(|(key, expected)| {
            data.get(key).map(|actual| actual == expected).unwrap_or(false)
        }),
        _ => true,
    }
}
