// [apps/control-plane/src/state/monitor.rs]
/*!
 * Observability monitor (spec.md §4.10): bounded log ring, connection
 * history, and per-node completed/failed counters. Grounded in the
 * teacher's `swarm_telemetry` + `event_bus` pairing but simplified to the
 * read-only views this spec calls for — no public WebSocket fan-out is
 * required, the duplex channel here is the worker protocol itself, not a
 * dashboard feed.
 */

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use vanguard_models::{ConnectionEvent, ConnectionEventKind, LogEntry};

const LOG_RING_CAPACITY: usize = 500;
const CONNECTION_HISTORY_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct NodeJobCounters {
    pub completed: u64,
    pub failed: u64,
}

struct MonitorInner {
    logs: VecDeque<LogEntry>,
    connection_history: VecDeque<ConnectionEvent>,
    node_counters: HashMap<String, NodeJobCounters>,
}

pub struct Monitor {
    inner: RwLock<MonitorInner>,
}

impl Monitor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(MonitorInner {
                logs: VecDeque::new(),
                connection_history: VecDeque::new(),
                node_counters: HashMap::new(),
            }),
        })
    }

    pub async fn record_log(&self, entry: LogEntry) {
        let mut guard = self.inner.write().await;
        if guard.logs.len() >= LOG_RING_CAPACITY {
            guard.logs.pop_front();
        }
        guard.logs.push_back(entry);
    }

    pub async fn record_connection(&self, node_id: impl Into<String>, kind: ConnectionEventKind) {
        let mut guard = self.inner.write().await;
        if guard.connection_history.len() >= CONNECTION_HISTORY_CAPACITY {
            guard.connection_history.pop_front();
        }
        guard.connection_history.push_back(ConnectionEvent {
            node_id: node_id.into(),
            kind,
            timestamp: Utc::now(),
        });
    }

    pub async fn record_job_outcome(&self, node_id: &str, succeeded: bool) {
        let mut guard = self.inner.write().await;
        let counters = guard.node_counters.entry(node_id.to_string()).or_default();
        if succeeded {
            counters.completed += 1;
        } else {
            counters.failed += 1;
        }
    }

    pub async fn logs(&self) -> Vec<LogEntry> {
        self.inner.read().await.logs.iter().cloned().collect()
    }

    pub async fn connection_history(&self) -> Vec<ConnectionEvent> {
        self.inner.read().await.connection_history.iter().cloned().collect()
    }

    pub async fn node_counters(&self) -> HashMap<String, NodeJobCounters> {
        self.inner.read().await.node_counters.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vanguard_models::LogLevel;

    #[tokio::test]
    async fn log_ring_evicts_oldest_entry_past_capacity() {
        let monitor = Monitor::new();
        for index in 0..(LOG_RING_CAPACITY + 10) {
            monitor
                .record_log(LogEntry::new(LogLevel::Info, "test", format!("entry {index}")))
                .await;
        }

        let logs = monitor.logs().await;
        assert_eq!(logs.len(), LOG_RING_CAPACITY);
        assert_eq!(logs.first().unwrap().message, "entry 10");
    }

    #[tokio::test]
    async fn node_counters_track_completed_and_failed_separately() {
        let monitor = Monitor::new();
        monitor.record_job_outcome("node-1", true).await;
        monitor.record_job_outcome("node-1", true).await;
        monitor.record_job_outcome("node-1", false).await;

        let counters = monitor.node_counters().await;
        let node_1 = counters.get("node-1").unwrap();
        assert_eq!(node_1.completed, 2);
        assert_eq!(node_1.failed, 1);
    }
}
