//! Durable-ish job queue: a worker pool with exactly one delivery attempt
//! per job and per-job status channels callers can await with a timeout.

mod job;
#[allow(clippy::module_inception)]
mod queue;

pub use job::{Job, JobResult, JobState, JobStatus};
pub use queue::{JobHandle, JobQueue, JobRunner, QueueCounts};
