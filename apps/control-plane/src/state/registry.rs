// [apps/control-plane/src/state/registry.rs]
/*!
 * Node registry (spec.md §4.2). Grounded in the teacher's
 * `swarm_telemetry::SwarmTelemetryManager`, generalized from read-only
 * dashboard metrics into the mutable register/heartbeat/unregister surface
 * the dispatcher and supervisor depend on.
 */

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, instrument, warn};
use vanguard_models::{NodeMetrics, NodeRecord, NodeStatus};

/// Outbound channel to one worker's socket-writer task. Holding only the
/// sender here (not the socket) lets the dispatcher address a node by id
/// without ever touching the connection itself (spec.md §9's "cyclic
/// references" note: identifiers flow through the dispatcher, channels are
/// resolved by the registry at send time).
pub type NodeChannel = mpsc::UnboundedSender<String>;

/// How long after going STALE a node is unregistered outright (spec.md §4.2).
const STALE_GRACE_SECONDS: i64 = 15;
/// Threshold beyond which a silent node is marked STALE (spec.md §4.2).
const STALE_THRESHOLD_SECONDS: i64 = 30;

struct RegistryEntry {
    record: NodeRecord,
    channel: NodeChannel,
    stale_since: Option<chrono::DateTime<Utc>>,
}

/// Thread-safe worker registry. Invariant: a live `node_id` maps to exactly
/// one outbound channel and at most one [`NodeRecord`] (spec.md §3).
pub struct NodeRegistry {
    nodes: RwLock<HashMap<String, RegistryEntry>>,
}

impl NodeRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            nodes: RwLock::new(HashMap::new()),
        })
    }

    /// Registers `node_id`, evicting (and closing) any previous channel for
    /// the same id first. Returns the previous channel, if any, so the
    /// caller can send it a `REPLACED` close frame.
    #[instrument(skip(self, channel))]
    pub async fn register(
        &self,
        node_id: String,
        channel: NodeChannel,
        capabilities: HashSet<String>,
        agent_types: HashSet<String>,
        wallet: Option<String>,
        version: String,
    ) -> Option<NodeChannel> {
        let record = NodeRecord::new(node_id.clone(), capabilities, agent_types, wallet, version);
        let mut guard = self.nodes.write().await;
        let previous = guard.remove(&node_id).map(|entry| entry.channel);

        guard.insert(
            node_id.clone(),
            RegistryEntry {
                record,
                channel,
                stale_since: None,
            },
        );

        if previous.is_some() {
            warn!(%node_id, "re-registration evicted a previous live channel");
        } else {
            info!(%node_id, "node registered");
        }

        previous
    }

    /// Updates a live node's metrics and heartbeat timestamp. Fails silently
    /// (returns `false`) on an unknown id, matching spec.md §4.2.
    pub async fn update_heartbeat(&self, node_id: &str, metrics: NodeMetrics) -> bool {
        let mut guard = self.nodes.write().await;
        match guard.get_mut(node_id) {
            Some(entry) => {
                entry.record.metrics = metrics;
                entry.record.last_heartbeat = Utc::now();
                entry.record.status = NodeStatus::Online;
                entry.stale_since = None;
                true
            }
            None => false,
        }
    }

    /// Swaps in the real outbound channel once the socket session's sender
    /// task exists, replacing the placeholder channel `register` installed
    /// at AUTH time. Returns the channel being replaced, if any.
    pub async fn replace_channel(&self, node_id: &str, channel: NodeChannel) -> Option<NodeChannel> {
        let mut guard = self.nodes.write().await;
        match guard.get_mut(node_id) {
            Some(entry) => Some(std::mem::replace(&mut entry.channel, channel)),
            None => None,
        }
    }

    pub async fn unregister(&self, node_id: &str) -> Option<NodeChannel> {
        let mut guard = self.nodes.write().await;
        let removed = guard.remove(node_id).map(|entry| entry.channel);
        if removed.is_some() {
            info!(%node_id, "node unregistered");
        }
        removed
    }

    pub async fn get(&self, node_id: &str) -> Option<NodeRecord> {
        self.nodes.read().await.get(node_id).map(|entry| entry.record.clone())
    }

    pub async fn channel_of(&self, node_id: &str) -> Option<NodeChannel> {
        self.nodes.read().await.get(node_id).map(|entry| entry.channel.clone())
    }

    pub async fn online_nodes(&self) -> Vec<NodeRecord> {
        self.nodes
            .read()
            .await
            .values()
            .map(|entry| entry.record.clone())
            .filter(|record| record.status == NodeStatus::Online)
            .collect()
    }

    pub async fn idle_nodes(&self) -> Vec<NodeRecord> {
        self.nodes
            .read()
            .await
            .values()
            .map(|entry| entry.record.clone())
            .filter(|record| record.is_idle())
            .collect()
    }

    pub async fn nodes_with_capability(&self, capability: &str) -> Vec<NodeRecord> {
        self.nodes
            .read()
            .await
            .values()
            .map(|entry| entry.record.clone())
            .filter(|record| record.has_capability(capability))
            .collect()
    }

    /// Picks the first idle node that explicitly advertises `agent_id` among
    /// its specialized `agentTypes` — unlike [`Self::idle_node_for_agent`],
    /// a generic node with no declared agent types never matches here. Used
    /// to route a full `AGENT_JOB` to a worker built to run that agent
    /// end-to-end, rather than the at-most-once generic `JOB_ASSIGN` lookup.
    pub async fn specialized_node_for_agent(&self, agent_id: &str) -> Option<NodeRecord> {
        self.nodes
            .read()
            .await
            .values()
            .map(|entry| &entry.record)
            .find(|record| record.is_idle() && !record.agent_types.is_empty() && record.agent_types.contains(agent_id))
            .cloned()
    }

    /// Picks the first idle node able to execute `agent_id`, or the first
    /// idle node overall when `agent_id` is `None` (spec.md §4.4).
    pub async fn idle_node_for_agent(&self, agent_id: Option<&str>) -> Option<NodeRecord> {
        let guard = self.nodes.read().await;
        let mut idle = guard.values().map(|entry| &entry.record).filter(|record| record.is_idle());

        match agent_id {
            Some(agent_id) => idle.find(|record| record.can_execute_agent(agent_id)).cloned(),
            None => idle.next().cloned(),
        }
    }

    /// Marks any node silent for longer than [`STALE_THRESHOLD_SECONDS`] as
    /// STALE, and unregisters (returning its channel for closure) any node
    /// that has been STALE for longer than [`STALE_GRACE_SECONDS`]. Intended
    /// to be called by a 5s scanner (spec.md §4.2).
    pub async fn sweep_stale(&self) -> Vec<(String, NodeChannel)> {
        let now = Utc::now();
        let mut guard = self.nodes.write().await;
        let mut expired = Vec::new();

        let stale_ids: Vec<String> = guard
            .iter()
            .filter_map(|(node_id, entry)| {
                let silent_for = (now - entry.record.last_heartbeat).num_seconds();
                if silent_for > STALE_THRESHOLD_SECONDS {
                    Some(node_id.clone())
                } else {
                    None
                }
            })
            .collect();

        for node_id in stale_ids {
            if let Some(entry) = guard.get_mut(&node_id) {
                if entry.record.status != NodeStatus::Stale {
                    entry.record.status = NodeStatus::Stale;
                    entry.stale_since = Some(now);
                    warn!(%node_id, "node marked STALE");
                } else if let Some(stale_since) = entry.stale_since {
                    if (now - stale_since).num_seconds() > STALE_GRACE_SECONDS {
                        expired.push(node_id.clone());
                    }
                }
            }
        }

        let mut evicted = Vec::with_capacity(expired.len());
        for node_id in expired {
            if let Some(entry) = guard.remove(&node_id) {
                warn!(%node_id, "node evicted after exceeding stale grace period");
                evicted.push((node_id, entry.channel));
            }
        }

        evicted
    }
}
