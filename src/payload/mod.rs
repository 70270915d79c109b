//! Structural validation of inbound webhook payloads.
//!
//! Runs synchronously before a job is queued; pure and side-effect-free.
//! The depth check walks the tree and short-circuits at the limit before
//! any serialization work is attempted.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Default maximum serialized payload size: 10 MB.
pub const DEFAULT_MAX_SIZE_BYTES: usize = 10 * 1024 * 1024;
/// Default maximum object-nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Limits applied to inbound payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct PayloadOptions {
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub allow_array_root: bool,
}

fn default_max_size_bytes() -> usize {
    DEFAULT_MAX_SIZE_BYTES
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for PayloadOptions {
    fn default() -> Self {
        PayloadOptions {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
            allow_array_root: false,
        }
    }
}

/// Rejection reasons for inbound payloads. These never become an
/// [`Execution`](crate::Execution); the job is refused before enqueue.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Payload cannot be null")]
    Null,
    #[error("Payload must be an object")]
    NotAnObject,
    #[error("Array payloads are not allowed for this webhook")]
    ArrayRoot,
    #[error("Payload size of {size} bytes exceeds the maximum of {limit} bytes")]
    TooLarge { size: usize, limit: usize },
    #[error("Payload nesting exceeds the maximum of {limit} levels")]
    TooDeep { limit: usize },
    #[error("Payload cannot be serialized to JSON: {0}")]
    NotSerializable(String),
}

/// Validate a payload against the configured limits.
pub fn validate(payload: &Value, options: &PayloadOptions) -> Result<(), PayloadError> {
    match payload {
        Value::Null => return Err(PayloadError::Null),
        Value::Array(_) if !options.allow_array_root => return Err(PayloadError::ArrayRoot),
        Value::Array(_) | Value::Object(_) => {}
        _ => return Err(PayloadError::NotAnObject),
    }

    // Depth first: cheap, and short-circuits without touching the full tree.
    if exceeds_depth(payload, options.max_depth) {
        return Err(PayloadError::TooDeep {
            limit: options.max_depth,
        });
    }

    let serialized =
        serde_json::to_vec(payload).map_err(|e| PayloadError::NotSerializable(e.to_string()))?;
    if serialized.len() > options.max_size_bytes {
        return Err(PayloadError::TooLarge {
            size: serialized.len(),
            limit: options.max_size_bytes,
        });
    }

    Ok(())
}

/// True if any object/array nesting goes beyond `limit` levels. The root
/// container counts as level one. Returns as soon as the limit is crossed.
fn exceeds_depth(value: &Value, limit: usize) -> bool {
    fn walk(value: &Value, level: usize, limit: usize) -> bool {
        match value {
            Value::Object(map) => {
                if level > limit {
                    return true;
                }
                map.values().any(|v| walk(v, level + 1, limit))
            }
            Value::Array(items) => {
                if level > limit {
                    return true;
                }
                items.iter().any(|v| walk(v, level + 1, limit))
            }
            _ => false,
        }
    }
    walk(value, 1, limit)
}
