// [crates/models/src/node.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Live status of a registered worker node (spec.md §3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NodeStatus {
    Online,
    Offline,
    Stale,
}

/// Point-in-time resource snapshot reported by a worker's HEARTBEAT frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct NodeMetrics {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub active_jobs: u32,
}

/// Registry entry for one authenticated worker node.
///
/// Owner: the connection supervisor creates it on successful AUTH, the
/// registry mutates it under its own lock, and the supervisor removes it on
/// disconnect. Invariant: a live `node_id` maps to exactly one outbound
/// channel and at most one `NodeRecord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_id: String,
    pub capabilities: HashSet<String>,
    pub agent_types: HashSet<String>,
    pub wallet: Option<String>,
    pub version: String,
    pub status: NodeStatus,
    pub connected_at: DateTime<Utc>,
    pub last_heartbeat: DateTime<Utc>,
    pub metrics: NodeMetrics,
}

impl NodeRecord {
    pub fn new(
        node_id: String,
        capabilities: HashSet<String>,
        agent_types: HashSet<String>,
        wallet: Option<String>,
        version: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            node_id,
            capabilities,
            agent_types,
            wallet,
            version,
            status: NodeStatus::Online,
            connected_at: now,
            last_heartbeat: now,
            metrics: NodeMetrics::default(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == NodeStatus::Online && self.metrics.active_jobs == 0
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn can_execute_agent(&self, agent_id: &str) -> bool {
        self.agent_types.is_empty() || self.agent_types.contains(agent_id)
    }
}
