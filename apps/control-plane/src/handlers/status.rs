// [apps/control-plane/src/handlers/status.rs]
//! `GET /health` and `GET /api/status` (spec.md §4.9, §6).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let online_nodes = state.registry.online_nodes().await;
    let idle_nodes = state.registry.idle_nodes().await;
    let catalogue = state.catalogue_snapshot().await;

    Json(json!({
        "nodes": {
            "online": online_nodes.len(),
            "idle": idle_nodes.len(),
        },
        "dispatcher": {
            "pending": state.dispatcher.pending_count().await,
        },
        "queue": {
            "pending": state.queue.pending_len().await,
            "running": state.queue.running_len().await,
            "deadLetter": state.queue.dead_letter_len().await,
        },
        "agents": {
            "count": catalogue.len(),
            "ids": catalogue.iter().map(|agent| agent.id.clone()).collect::<Vec<_>>(),
        },
    }))
}
