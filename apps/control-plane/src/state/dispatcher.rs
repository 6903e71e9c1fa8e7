// [apps/control-plane/src/state/dispatcher.rs]
/*!
 * Job dispatcher (spec.md §4.4): correlated at-most-once in-flight
 * registration of one job with a worker, with deadline-based timeout.
 *
 * Grounded in the teacher's `handlers/stream.rs` triple-task shutdown
 * pattern for "whichever side finishes first wins, the other is a no-op" —
 * here specialized to a single `runId`'s pending entry instead of a whole
 * socket session. `remove` on the pending map is the sole consuming
 * operation: whichever of {inbound JOB_RESULT handler, deadline timer}
 * calls it first publishes the outcome, the loser observes `None`.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tracing::{instrument, warn};
use uuid::Uuid;
use vanguard_models::NodeRecord;
use vanguard_protocol::{Frame, JobResultError, JobResultMetrics, JobResultStatus};

use crate::errors::DispatchError;
use crate::state::registry::NodeRegistry;

/// Default timeout for an `AGENT_JOB` dispatch (spec.md §5(iv)).
pub const DEFAULT_AGENT_JOB_TIMEOUT_MS: u64 = 60_000;

/// Published exactly once per `runId` (spec.md §8 "exactly-one outcome").
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Success {
        output: Option<serde_json::Value>,
        logs: Vec<String>,
        metrics: JobResultMetrics,
    },
    Error(JobResultError),
    Timeout,
}

/// Published exactly once per `jobId` for an `AGENT_JOB` dispatch, mirroring
/// [`DispatchOutcome`] for the `AGENT_JOB`/`AGENT_JOB_RESULT` pair.
#[derive(Debug, Clone)]
pub enum AgentJobOutcome {
    Success {
        response: String,
        tools_used: Vec<String>,
        metrics: Option<serde_json::Value>,
    },
    Error(JobResultError),
    Timeout,
}

struct PendingEntry {
    sender: Option<oneshot::Sender<DispatchOutcome>>,
}

struct PendingAgentEntry {
    sender: Option<oneshot::Sender<AgentJobOutcome>>,
}

pub struct JobDispatcher {
    registry: Arc<NodeRegistry>,
    pending: Mutex<HashMap<String, PendingEntry>>,
    pending_agent_jobs: Mutex<HashMap<String, PendingAgentEntry>>,
}

impl JobDispatcher {
    pub fn new(registry: Arc<NodeRegistry>) -> Arc<Self> {
        Arc::new(Self {
            registry,
            pending: Mutex::new(HashMap::new()),
            pending_agent_jobs: Mutex::new(HashMap::new()),
        })
    }

    /// Picks an idle node, allocates `jobId`/`runId`, registers the pending
    /// entry, sends `JOB_ASSIGN`, and awaits the result or the deadline —
    /// whichever comes first (spec.md §4.4). Returns the allocated
    /// `(job_id, run_id)` alongside the outcome so HTTP callers can echo
    /// them back to the caller (spec.md §6's `/api/run` response shape).
    #[instrument(skip(self, input, context), fields(agent_id = agent_id.unwrap_or("*")))]
    pub async fn dispatch(
        &self,
        input: serde_json::Value,
        agent_id: Option<&str>,
        timeout_ms: u64,
        context: Option<serde_json::Value>,
        script: Option<String>,
    ) -> Result<(String, String, DispatchOutcome), DispatchError> {
        let node = self
            .registry
            .idle_node_for_agent(agent_id)
            .await
            .ok_or(DispatchError::NoIdleNode)?;

        self.dispatch_to_node(node, agent_id.unwrap_or_default().to_string(), input, timeout_ms, context, script)
            .await
    }

    /// Dispatches to the first idle node advertising `capability`, used for
    /// tool calls that are worker-bound by `tool:<name>` rather than tied to
    /// a specific agent id (spec.md §4.8(b)). Unlike [`Self::dispatch`], this
    /// never falls back to an arbitrary idle node: a tool call with no node
    /// advertising its capability is a `NoIdleNode` error.
    #[instrument(skip(self, input, context), fields(%capability))]
    pub async fn dispatch_with_capability(
        &self,
        capability: &str,
        input: serde_json::Value,
        timeout_ms: u64,
        context: Option<serde_json::Value>,
        script: Option<String>,
    ) -> Result<(String, String, DispatchOutcome), DispatchError> {
        let node = self
            .registry
            .nodes_with_capability(capability)
            .await
            .into_iter()
            .find(|candidate| candidate.is_idle())
            .ok_or(DispatchError::NoIdleNode)?;

        self.dispatch_to_node(node, String::new(), input, timeout_ms, context, script).await
    }

    async fn dispatch_to_node(
        &self,
        node: NodeRecord,
        agent_id: String,
        input: serde_json::Value,
        timeout_ms: u64,
        context: Option<serde_json::Value>,
        script: Option<String>,
    ) -> Result<(String, String, DispatchOutcome), DispatchError> {
        let channel = self
            .registry
            .channel_of(&node.node_id)
            .await
            .ok_or(DispatchError::NoIdleNode)?;

        let job_id = Uuid::new_v4().to_string();
        let run_id = Uuid::new_v4().to_string();

        let (sender, receiver) = oneshot::channel();
        self.pending.lock().await.insert(
            run_id.clone(),
            PendingEntry {
                sender: Some(sender),
            },
        );

        let frame = Frame::JobAssign {
            trace_id: Uuid::new_v4(),
            timestamp: vanguard_protocol::now_ms(),
            job_id: job_id.clone(),
            run_id: run_id.clone(),
            agent_id,
            input,
            timeout_ms: Some(timeout_ms),
            context,
            script,
            tool_call: None,
        };

        let wire = frame.to_wire().map_err(|err| DispatchError::Codec(err.to_string()))?;
        if channel.send(wire).is_err() {
            self.pending.lock().await.remove(&run_id);
            return Err(DispatchError::NoIdleNode);
        }

        let outcome = self.await_outcome(run_id.clone(), receiver, timeout_ms).await?;
        Ok((job_id, run_id, outcome))
    }

    /// Dispatches a full `AGENT_JOB` to the first idle node that declares
    /// `agent_type` among its specialized agent types, mirroring
    /// [`Self::dispatch`] for the `AGENT_JOB`/`AGENT_JOB_RESULT` pair
    /// (spec.md §5(iv), SPEC_FULL.md §8).
    #[instrument(skip(self, user_query, context), fields(%agent_type))]
    pub async fn dispatch_agent_job(
        &self,
        agent_type: &str,
        user_query: String,
        context: Option<serde_json::Value>,
        timeout_ms: u64,
    ) -> Result<(String, AgentJobOutcome), DispatchError> {
        let node = self
            .registry
            .specialized_node_for_agent(agent_type)
            .await
            .ok_or(DispatchError::NoIdleNode)?;

        let channel = self
            .registry
            .channel_of(&node.node_id)
            .await
            .ok_or(DispatchError::NoIdleNode)?;

        let job_id = Uuid::new_v4().to_string();
        let (sender, receiver) = oneshot::channel();
        self.pending_agent_jobs
            .lock()
            .await
            .insert(job_id.clone(), PendingAgentEntry { sender: Some(sender) });

        let frame = Frame::AgentJob {
            trace_id: Uuid::new_v4(),
            timestamp: vanguard_protocol::now_ms(),
            job_id: job_id.clone(),
            agent_type: agent_type.to_string(),
            user_query,
            context,
        };

        let wire = frame.to_wire().map_err(|err| DispatchError::Codec(err.to_string()))?;
        if channel.send(wire).is_err() {
            self.pending_agent_jobs.lock().await.remove(&job_id);
            return Err(DispatchError::NoIdleNode);
        }

        let outcome = self.await_agent_outcome(job_id.clone(), receiver, timeout_ms).await?;
        Ok((job_id, outcome))
    }

    async fn await_agent_outcome(
        &self,
        job_id: String,
        receiver: oneshot::Receiver<AgentJobOutcome>,
        timeout_ms: u64,
    ) -> Result<AgentJobOutcome, DispatchError> {
        tokio::select! {
            result = receiver => {
                result.map_err(|_| DispatchError::Internal("pending agent job dropped without publishing".to_string()))
            }
            _ = tokio::time::sleep(Duration::from_millis(timeout_ms)) => {
                self.resolve_agent_timeout(&job_id).await;
                Ok(AgentJobOutcome::Timeout)
            }
        }
    }

    async fn resolve_agent_timeout(&self, job_id: &str) {
        let mut guard = self.pending_agent_jobs.lock().await;
        if guard.remove(job_id).is_some() {
            warn!(%job_id, "agent job deadline fired, publishing Timeout");
        }
    }

    /// Routes an inbound `AGENT_JOB_RESULT` to its waiter by `job_id`. A
    /// missing entry means the deadline already fired (late reply) and is
    /// logged and discarded, not an error, matching [`Self::resolve_result`].
    #[instrument(skip(self, response, tools_used, metrics, error))]
    pub async fn resolve_agent_result(
        &self,
        job_id: &str,
        success: bool,
        response: String,
        tools_used: Option<Vec<String>>,
        metrics: Option<serde_json::Value>,
        error: Option<JobResultError>,
    ) {
        let sender = {
            let mut guard = self.pending_agent_jobs.lock().await;
            guard.remove(job_id).and_then(|mut entry| entry.sender.take())
        };

        let Some(sender) = sender else {
            warn!(%job_id, "late AGENT_JOB_RESULT for a job with no pending entry, discarding");
            return;
        };

        let outcome = if success {
            AgentJobOutcome::Success {
                response,
                tools_used: tools_used.unwrap_or_default(),
                metrics,
            }
        } else {
            AgentJobOutcome::Error(error.unwrap_or(JobResultError {
                code: "UNKNOWN".to_string(),
                message: "worker reported AGENT_JOB failure without details".to_string(),
                stack: None,
            }))
        };

        let _ = sender.send(outcome);
    }

    async fn await_outcome(
        &self,
        run_id: String,
        receiver: oneshot::Receiver<DispatchOutcome>,
        timeout_ms: u64,
    ) -> Result<DispatchOutcome, DispatchError> {
        tokio::select! {
            result = receiver => {
                result.map_err(|_| DispatchError::Internal("pending entry dropped without publishing".to_string()))
            }
            _ = tokio::time::sleep(Duration::from_millis(timeout_ms)) => {
                self.resolve_timeout(&run_id).await;
                Ok(DispatchOutcome::Timeout)
            }
        }
    }

    async fn resolve_timeout(&self, run_id: &str) {
        let mut guard = self.pending.lock().await;
        if guard.remove(run_id).is_some() {
            warn!(%run_id, "dispatch deadline fired, publishing Timeout");
        }
    }

    /// Routes an inbound `JOB_RESULT` to its waiter by `run_id`. A missing
    /// entry means the deadline already fired (late reply) and is logged and
    /// discarded, not an error (spec.md §4.4).
    #[instrument(skip(self, output, logs, error, metrics))]
    pub async fn resolve_result(
        &self,
        run_id: &str,
        status: JobResultStatus,
        output: Option<serde_json::Value>,
        logs: Vec<String>,
        error: Option<JobResultError>,
        metrics: JobResultMetrics,
    ) {
        let sender = {
            let mut guard = self.pending.lock().await;
            guard.remove(run_id).and_then(|mut entry| entry.sender.take())
        };

        let Some(sender) = sender else {
            warn!(%run_id, "late JOB_RESULT for a run with no pending entry, discarding");
            return;
        };

        let outcome = match status {
            JobResultStatus::Success => DispatchOutcome::Success { output, logs, metrics },
            JobResultStatus::Error => DispatchOutcome::Error(error.unwrap_or(JobResultError {
                code: "UNKNOWN".to_string(),
                message: "worker reported ERROR without details".to_string(),
                stack: None,
            })),
            JobResultStatus::Timeout => DispatchOutcome::Timeout,
        };

        let _ = sender.send(outcome);
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatch_fails_fast_with_no_registered_nodes() {
        let registry = NodeRegistry::new();
        let dispatcher = JobDispatcher::new(registry);

        let result = dispatcher
            .dispatch(serde_json::json!({}), Some("travel-planner"), 100, None, None)
            .await;

        assert!(matches!(result, Err(DispatchError::NoIdleNode)));
    }

    #[tokio::test]
    async fn resolve_result_on_unknown_run_id_is_a_noop() {
        let registry = NodeRegistry::new();
        let dispatcher = JobDispatcher::new(registry);

        dispatcher
            .resolve_result(
                "nonexistent-run-id",
                JobResultStatus::Success,
                None,
                vec![],
                None,
                JobResultMetrics { start_time: 0, end_time: 0, duration_ms: 0 },
            )
            .await;

        assert_eq!(dispatcher.pending_count().await, 0);
    }
}
