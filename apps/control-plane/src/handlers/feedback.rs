// [apps/control-plane/src/handlers/feedback.rs]
//! `POST /api/feedback` (spec.md §4.9). Not a billed or dispatched
//! operation: feedback is recorded into the observability monitor's log
//! ring so operators can review it alongside worker/job logs.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use vanguard_models::{LogEntry, LogLevel};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub message: String,
    #[serde(default)]
    pub wallet: Option<String>,
    #[serde(default, rename = "queryHash")]
    pub query_hash: Option<String>,
}

pub async fn feedback(State(state): State<AppState>, Json(request): Json<FeedbackRequest>) -> impl IntoResponse {
    let message = match (&request.wallet, &request.query_hash) {
        (Some(wallet), Some(query_hash)) => format!("[{wallet} / {query_hash}] {}", request.message),
        (Some(wallet), None) => format!("[{wallet}] {}", request.message),
        (None, Some(query_hash)) => format!("[{query_hash}] {}", request.message),
        (None, None) => request.message,
    };

    state.monitor.record_log(LogEntry::new(LogLevel::Info, "feedback", message)).await;

    Json(json!({ "success": true }))
}
