use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::error::EngineError;

use super::job::{Job, JobResult, JobState};

/// Executes one job to completion. Implemented by the orchestrator and,
/// in queue tests, by stand-ins.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: Job) -> JobResult;
}

/// Snapshot of queue occupancy. Both counts drain to zero once every
/// enqueued job has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueCounts {
    pub waiting: usize,
    pub active: usize,
}

struct QueuedJob {
    job: Job,
    state_tx: watch::Sender<JobState>,
}

/// Handle to one enqueued job, resolvable independently of the queue.
#[derive(Debug, Clone)]
pub struct JobHandle {
    pub job_id: String,
    state_rx: watch::Receiver<JobState>,
}

impl JobHandle {
    /// Block until the job settles.
    pub async fn wait(&self) -> JobResult {
        let mut rx = self.state_rx.clone();
        loop {
            let state = rx.borrow().clone();
            if let JobState::Done(result) = state {
                return result;
            }
            if rx.changed().await.is_err() {
                // Sender dropped without a terminal state; report it as a
                // job-level failure rather than hanging forever.
                return JobResult::error(None, "Job queue is shut down", 1);
            }
        }
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`. The job
    /// itself keeps running; only the caller stops waiting.
    pub async fn wait_timeout(&self, timeout: Duration) -> Result<JobResult, EngineError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| EngineError::ResultTimeout)
    }
}

/// Worker-pool queue with single-attempt delivery.
///
/// Settled job states are retained for late lookups by id, bounded to the
/// most recent `retained_results` jobs; older entries are evicted.
pub struct JobQueue {
    tx: mpsc::Sender<QueuedJob>,
    workers: Vec<JoinHandle<()>>,
    states: Arc<DashMap<String, watch::Receiver<JobState>>>,
    waiting: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
}

impl JobQueue {
    /// Spawn `workers` consumers over a channel of `buffer` capacity.
    pub fn start(
        workers: usize,
        buffer: usize,
        retained_results: usize,
        runner: Arc<dyn JobRunner>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<QueuedJob>(buffer);
        let rx = Arc::new(Mutex::new(rx));
        let states: Arc<DashMap<String, watch::Receiver<JobState>>> = Arc::new(DashMap::new());
        let settled = Arc::new(parking_lot::Mutex::new(VecDeque::new()));
        let waiting = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));

        let mut worker_handles = Vec::with_capacity(workers.max(1));
        for worker_id in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let runner = Arc::clone(&runner);
            let states = Arc::clone(&states);
            let settled = Arc::clone(&settled);
            let waiting = Arc::clone(&waiting);
            let active = Arc::clone(&active);

            worker_handles.push(tokio::spawn(async move {
                loop {
                    let queued = {
                        let mut rx = rx.lock().await;
                        rx.recv().await
                    };
                    let Some(QueuedJob { job, state_tx }) = queued else {
                        break;
                    };
                    let job_id = job.id.clone();

                    waiting.fetch_sub(1, Ordering::SeqCst);
                    active.fetch_add(1, Ordering::SeqCst);
                    let _ = state_tx.send(JobState::Active);

                    tracing::debug!(worker_id, job_id = %job.id, flow_id = %job.flow_id, "job picked up");
                    let result = runner.run(job).await;

                    // Drop the active count before publishing the result so
                    // counts read as drained once every caller has settled.
                    active.fetch_sub(1, Ordering::SeqCst);
                    let _ = state_tx.send(JobState::Done(result));

                    // Retention: evict the oldest settled entries beyond the
                    // retention window so the state map stays bounded.
                    let mut settled = settled.lock();
                    settled.push_back(job_id);
                    while settled.len() > retained_results {
                        if let Some(evicted) = settled.pop_front() {
                            states.remove(&evicted);
                        }
                    }
                }
            }));
        }

        JobQueue {
            tx,
            workers: worker_handles,
            states,
            waiting,
            active,
        }
    }

    /// Stop accepting new jobs and wait for the workers to drain the
    /// channel. Already-enqueued jobs still run to completion; their
    /// handles settle as usual.
    pub async fn shutdown(self) -> QueueCounts {
        drop(self.tx);
        for worker in self.workers {
            let _ = worker.await;
        }
        QueueCounts {
            waiting: self.waiting.load(Ordering::SeqCst),
            active: self.active.load(Ordering::SeqCst),
        }
    }

    /// Enqueue one job for a single delivery attempt.
    pub async fn enqueue(&self, job: Job) -> Result<JobHandle, EngineError> {
        let (state_tx, state_rx) = watch::channel(JobState::Waiting);
        let job_id = job.id.clone();
        self.states.insert(job_id.clone(), state_rx.clone());
        self.waiting.fetch_add(1, Ordering::SeqCst);

        if self.tx.send(QueuedJob { job, state_tx }).await.is_err() {
            self.waiting.fetch_sub(1, Ordering::SeqCst);
            self.states.remove(&job_id);
            return Err(EngineError::QueueClosed);
        }

        Ok(JobHandle { job_id, state_rx })
    }

    /// Await the result of a previously enqueued job by id.
    ///
    /// Expiry raises [`EngineError::ResultTimeout`] without cancelling or
    /// removing the job; the result stays queryable afterwards.
    pub async fn await_result(
        &self,
        job_id: &str,
        timeout: Duration,
    ) -> Result<JobResult, EngineError> {
        let state_rx = self
            .states
            .get(job_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| EngineError::JobNotFound(job_id.to_string()))?;

        let handle = JobHandle {
            job_id: job_id.to_string(),
            state_rx,
        };
        handle.wait_timeout(timeout).await
    }

    pub fn counts(&self) -> QueueCounts {
        QueueCounts {
            waiting: self.waiting.load(Ordering::SeqCst),
            active: self.active.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::TriggerData;
    use chrono::Utc;
    use serde_json::json;

    fn job(id: &str) -> Job {
        Job {
            id: id.to_string(),
            flow_id: "f1".to_string(),
            webhook_node_id: "w".to_string(),
            payload: json!({}),
            trigger: TriggerData {
                method: "POST".to_string(),
                headers: Default::default(),
                query_params: Default::default(),
                webhook_id: "w".to_string(),
                timestamp: Utc::now(),
            },
            attempt: 1,
        }
    }

    struct EchoRunner;

    #[async_trait]
    impl JobRunner for EchoRunner {
        async fn run(&self, job: Job) -> JobResult {
            JobResult::success(format!("exec-{}", job.id), 0, job.attempt)
        }
    }

    struct SlowRunner(Duration);

    #[async_trait]
    impl JobRunner for SlowRunner {
        async fn run(&self, job: Job) -> JobResult {
            tokio::time::sleep(self.0).await;
            JobResult::success(format!("exec-{}", job.id), 0, job.attempt)
        }
    }

    #[tokio::test]
    async fn test_enqueue_and_wait() {
        let queue = JobQueue::start(2, 16, 1024, Arc::new(EchoRunner));
        let handle = queue.enqueue(job("j1")).await.unwrap();
        let result = handle.wait().await;
        assert!(result.is_success());
        assert_eq!(result.execution_id.as_deref(), Some("exec-j1"));
        assert_eq!(result.attempts_made, 1);
    }

    #[tokio::test]
    async fn test_await_result_by_id() {
        let queue = JobQueue::start(1, 16, 1024, Arc::new(EchoRunner));
        queue.enqueue(job("j1")).await.unwrap();
        let result = queue
            .await_result("j1", Duration::from_secs(2))
            .await
            .unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_await_unknown_job() {
        let queue = JobQueue::start(1, 16, 1024, Arc::new(EchoRunner));
        let err = queue
            .await_result("ghost", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::JobNotFound(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_distinct_and_job_survives() {
        let queue = JobQueue::start(1, 16, 1024, Arc::new(SlowRunner(Duration::from_millis(150))));
        let handle = queue.enqueue(job("j1")).await.unwrap();

        let err = queue
            .await_result("j1", Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ResultTimeout));

        // The job was not cancelled by the caller timing out.
        let result = handle.wait().await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_counts_drain_to_zero() {
        let queue = JobQueue::start(4, 64, 1024, Arc::new(EchoRunner));
        let handles: Vec<_> = {
            let mut handles = Vec::new();
            for i in 0..20 {
                handles.push(queue.enqueue(job(&format!("j{i}"))).await.unwrap());
            }
            handles
        };
        for handle in handles {
            handle.wait().await;
        }
        assert_eq!(queue.counts(), QueueCounts { waiting: 0, active: 0 });
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending_jobs() {
        let queue = JobQueue::start(2, 64, 1024, Arc::new(EchoRunner));
        let mut handles = Vec::new();
        for i in 0..10 {
            handles.push(queue.enqueue(job(&format!("j{i}"))).await.unwrap());
        }

        let counts = queue.shutdown().await;
        assert_eq!(counts, QueueCounts { waiting: 0, active: 0 });

        // Every job enqueued before shutdown still settled.
        for handle in handles {
            assert!(handle.wait().await.is_success());
        }
    }

    #[tokio::test]
    async fn test_settled_state_retention_is_bounded() {
        let queue = JobQueue::start(1, 16, 2, Arc::new(EchoRunner));
        let mut handles = Vec::new();
        for i in 0..5 {
            handles.push(queue.enqueue(job(&format!("j{i}"))).await.unwrap());
        }
        for handle in &handles {
            handle.wait().await;
        }

        // Only the two most recently settled jobs are still addressable
        // by id; older entries were evicted.
        let err = queue
            .await_result("j0", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::JobNotFound(_)));

        let result = queue
            .await_result("j4", Duration::from_secs(2))
            .await
            .unwrap();
        assert!(result.is_success());

        // Eviction only touches the by-id map; the caller's handle still
        // carries the settled result.
        assert!(handles[0].wait().await.is_success());
    }
}
