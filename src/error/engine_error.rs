//! Engine-level error types.

use crate::payload::PayloadError;
use thiserror::Error;

/// Errors that terminate a job or reject it before it is queued.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),
    #[error("Flow not found: {0}")]
    FlowNotFound(String),
    #[error("Flow is not active: {0}")]
    FlowInactive(String),
    #[error("Webhook node not found: {0}")]
    WebhookNodeNotFound(String),
    #[error("Node type not supported: {0}")]
    NodeTypeNotSupported(String),
    #[error("Node execution error: node={node_id}, error={error}")]
    NodeExecutionFailed { node_id: String, error: String },
    #[error("Timed out waiting for job result")]
    ResultTimeout,
    #[error("Job not found: {0}")]
    JobNotFound(String),
    #[error("Job queue is shut down")]
    QueueClosed,
    #[error("Internal error: {0}")]
    InternalError(String),
}
