use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::execution::TriggerData;

/// One queued trigger: a flow, the webhook node that received the call,
/// and the validated payload. Consumed exactly once (retries disabled).
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub flow_id: String,
    pub webhook_node_id: String,
    pub payload: Value,
    pub trigger: TriggerData,
    /// Delivery attempt number, always 1 under the single-attempt policy.
    pub attempt: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Success,
    Error,
}

/// The outcome reported to the HTTP layer or polled by job id.
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub status: JobStatus,
    /// Defined whenever an execution shell was created, including most
    /// error paths.
    pub execution_id: Option<String>,
    pub error: bool,
    pub message: Option<String>,
    pub duration_ms: Option<i64>,
    pub attempts_made: u32,
}

impl JobResult {
    pub fn success(execution_id: String, duration_ms: i64, attempts_made: u32) -> Self {
        JobResult {
            status: JobStatus::Success,
            execution_id: Some(execution_id),
            error: false,
            message: None,
            duration_ms: Some(duration_ms),
            attempts_made,
        }
    }

    pub fn error(
        execution_id: Option<String>,
        message: impl Into<String>,
        attempts_made: u32,
    ) -> Self {
        JobResult {
            status: JobStatus::Error,
            execution_id,
            error: true,
            message: Some(message.into()),
            duration_ms: None,
            attempts_made,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Success
    }
}

/// Observable lifecycle of one queued job.
#[derive(Debug, Clone)]
pub enum JobState {
    Waiting,
    Active,
    Done(JobResult),
}
