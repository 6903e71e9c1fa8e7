// [crates/models/src/job.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Success,
    Failed,
    Timeout,
    Dead,
}

/// A unit of dispatched work, tracked across at-least-one delivery attempts.
///
/// `job_id` identifies the logical work item across retries; `run_id`
/// correlates exactly one in-flight delivery attempt (spec.md §3, §8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub run_id: String,
    pub agent_id: String,
    pub input: serde_json::Value,
    pub required_capabilities: HashSet<String>,
    pub timeout_ms: u64,
    pub retry_count: u32,
    pub max_retries: u32,
    pub created_at: DateTime<Utc>,
    pub status: JobStatus,
}

impl JobRecord {
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    pub fn new(
        agent_id: String,
        input: serde_json::Value,
        required_capabilities: HashSet<String>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            job_id: uuid::Uuid::new_v4().to_string(),
            run_id: uuid::Uuid::new_v4().to_string(),
            agent_id,
            input,
            required_capabilities,
            timeout_ms,
            retry_count: 0,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            created_at: Utc::now(),
            status: JobStatus::Pending,
        }
    }

    /// Mints a fresh correlation id for a re-delivery attempt of the same
    /// logical `job_id`, matching spec.md's retry semantics (the `job_id`
    /// persists across retries while each attempt gets its own `run_id`).
    pub fn reissue_run_id(&mut self) {
        self.run_id = uuid::Uuid::new_v4().to_string();
    }

    pub fn capabilities_satisfied_by(&self, offered: &HashSet<String>) -> bool {
        self.required_capabilities.is_subset(offered)
    }
}
