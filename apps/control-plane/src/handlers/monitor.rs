// [apps/control-plane/src/handlers/monitor.rs]
//! `GET /api/monitor`, `/api/monitor/nodes`, `/api/monitor/logs`,
//! `/api/monitor/history` (spec.md §4.9, §4.10). Read-only views over the
//! registry and the observability monitor; no mutation happens here.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn summary(State(state): State<AppState>) -> impl IntoResponse {
    let online_nodes = state.registry.online_nodes().await;
    let idle_nodes = state.registry.idle_nodes().await;
    let node_counters = state.monitor.node_counters().await;

    let completed: u64 = node_counters.values().map(|counters| counters.completed).sum();
    let failed: u64 = node_counters.values().map(|counters| counters.failed).sum();

    Json(json!({
        "nodesOnline": online_nodes.len(),
        "nodesIdle": idle_nodes.len(),
        "jobsCompleted": completed,
        "jobsFailed": failed,
    }))
}

pub async fn nodes(State(state): State<AppState>) -> impl IntoResponse {
    let online_nodes = state.registry.online_nodes().await;
    let node_counters = state.monitor.node_counters().await;

    let nodes: Vec<_> = online_nodes
        .into_iter()
        .map(|record| {
            let counters = node_counters.get(&record.node_id).copied().unwrap_or_default();
            json!({
                "nodeId": record.node_id,
                "status": record.status,
                "capabilities": record.capabilities,
                "agentTypes": record.agent_types,
                "version": record.version,
                "connectedAt": record.connected_at,
                "lastHeartbeat": record.last_heartbeat,
                "metrics": record.metrics,
                "jobsCompleted": counters.completed,
                "jobsFailed": counters.failed,
            })
        })
        .collect();

    Json(json!({ "nodes": nodes }))
}

pub async fn logs(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "logs": state.monitor.logs().await }))
}

pub async fn history(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "history": state.monitor.connection_history().await }))
}
