// [apps/control-plane/src/state/queue.rs]
/*!
 * Job queue with retry accounting and dead-letter (spec.md §4.5). Kept
 * deliberately independent of [`crate::state::dispatcher::JobDispatcher`]:
 * the dispatcher is the low-level at-most-once in-flight correlation
 * primitive, the queue is the retry/backoff policy layer above it.
 */

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use vanguard_models::{JobRecord, JobStatus};

const COMPLETED_CAPACITY: usize = 500;

struct QueueInner {
    pending: VecDeque<JobRecord>,
    running: HashMap<String, JobRecord>,
    completed: VecDeque<JobRecord>,
    dead_letter: Vec<JobRecord>,
}

pub struct JobQueue {
    inner: Mutex<QueueInner>,
}

impl JobQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(QueueInner {
                pending: VecDeque::new(),
                running: HashMap::new(),
                completed: VecDeque::new(),
                dead_letter: Vec::new(),
            }),
        })
    }

    pub async fn enqueue(&self, job: JobRecord) {
        self.inner.lock().await.pending.push_back(job);
    }

    /// Returns the first pending job whose `required_capabilities` are a
    /// subset of `capabilities`, removing it from the pending queue.
    pub async fn dequeue(&self, capabilities: &std::collections::HashSet<String>) -> Option<JobRecord> {
        let mut guard = self.inner.lock().await;
        let position = guard
            .pending
            .iter()
            .position(|job| job.capabilities_satisfied_by(capabilities))?;
        guard.pending.remove(position)
    }

    #[instrument(skip(self, job))]
    pub async fn mark_running(&self, mut job: JobRecord, node_id: &str) {
        job.status = JobStatus::Running;
        info!(run_id = %job.run_id, job_id = %job.job_id, %node_id, "job marked running");
        self.inner.lock().await.running.insert(job.run_id.clone(), job);
    }

    #[instrument(skip(self))]
    pub async fn mark_complete(&self, run_id: &str, success: bool) -> Option<JobRecord> {
        let mut guard = self.inner.lock().await;
        let mut job = guard.running.remove(run_id)?;
        job.status = if success { JobStatus::Success } else { JobStatus::Failed };

        if guard.completed.len() >= COMPLETED_CAPACITY {
            guard.completed.pop_front();
        }
        guard.completed.push_back(job.clone());
        Some(job)
    }

    /// Increments `retry_count`; moves the job to dead-letter at
    /// `max_retries`, otherwise returns it to the tail of pending with a
    /// freshly minted `run_id` (spec.md §4.5, §8 "retry bound").
    #[instrument(skip(self))]
    pub async fn mark_timeout(&self, run_id: &str) -> JobStatus {
        let mut guard = self.inner.lock().await;
        let Some(mut job) = guard.running.remove(run_id) else {
            return JobStatus::Timeout;
        };

        job.retry_count += 1;

        if job.retry_count >= job.max_retries {
            job.status = JobStatus::Dead;
            warn!(
                job_id = %job.job_id,
                retries = job.retry_count,
                "job exceeded max retries, moving to dead-letter"
            );
            guard.dead_letter.push(job);
            JobStatus::Dead
        } else {
            job.status = JobStatus::Pending;
            job.reissue_run_id();
            guard.pending.push_back(job);
            JobStatus::Pending
        }
    }

    /// Scans `running` for records whose `timeout_ms` has elapsed and
    /// resolves each through [`Self::mark_timeout`]. Intended to be driven by
    /// a 5s scanner (spec.md §4.5).
    pub async fn sweep_timeouts(&self) -> Vec<String> {
        let expired_run_ids: Vec<String> = {
            let guard = self.inner.lock().await;
            let now = Utc::now();
            guard
                .running
                .values()
                .filter(|job| (now - job.created_at).num_milliseconds() > job.timeout_ms as i64)
                .map(|job| job.run_id.clone())
                .collect()
        };

        for run_id in &expired_run_ids {
            self.mark_timeout(run_id).await;
        }

        expired_run_ids
    }

    pub async fn pending_len(&self) -> usize {
        self.inner.lock().await.pending.len()
    }

    pub async fn running_len(&self) -> usize {
        self.inner.lock().await.running.len()
    }

    pub async fn dead_letter_len(&self) -> usize {
        self.inner.lock().await.dead_letter.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample_job() -> JobRecord {
        JobRecord::new("travel-planner".to_string(), serde_json::json!({}), HashSet::new(), 500)
    }

    #[tokio::test]
    async fn enqueue_then_dequeue_preserves_retry_count() {
        let queue = JobQueue::new();
        let job = sample_job();
        let run_id = job.run_id.clone();
        queue.enqueue(job).await;

        let dequeued = queue.dequeue(&HashSet::new()).await.unwrap();
        assert_eq!(dequeued.run_id, run_id);
        assert_eq!(dequeued.retry_count, 0);
    }

    #[tokio::test]
    async fn job_reaches_dead_letter_only_after_max_retries() {
        let queue = JobQueue::new();
        let job = sample_job();
        let mut run_id = job.run_id.clone();
        queue.mark_running(job, "node-1").await;

        for expected_retry in 1..3 {
            let status = queue.mark_timeout(&run_id).await;
            assert_eq!(status, JobStatus::Pending);
            let requeued = queue.dequeue(&HashSet::new()).await.unwrap();
            assert_eq!(requeued.retry_count, expected_retry);
            run_id = requeued.run_id.clone();
            queue.mark_running(requeued, "node-1").await;
        }

        let final_status = queue.mark_timeout(&run_id).await;
        assert_eq!(final_status, JobStatus::Dead);
        assert_eq!(queue.dead_letter_len().await, 1);
    }

    #[tokio::test]
    async fn dequeue_skips_jobs_whose_capabilities_are_unmet() {
        let queue = JobQueue::new();
        let mut job = sample_job();
        job.required_capabilities.insert("docker".to_string());
        queue.enqueue(job).await;

        assert!(queue.dequeue(&HashSet::new()).await.is_none());

        let mut offered = HashSet::new();
        offered.insert("docker".to_string());
        assert!(queue.dequeue(&offered).await.is_some());
    }
}
