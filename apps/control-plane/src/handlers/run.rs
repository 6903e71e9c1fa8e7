// [apps/control-plane/src/handlers/run.rs]
//! `POST /api/run` — single dispatch against one idle worker (spec.md §4.9,
//! §6). No balance charge: single dispatch is the lower-level primitive the
//! orchestrated `/api/chat` endpoint builds on, not a billed query.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::dispatcher::DispatchOutcome;
use crate::state::AppState;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub input: Value,
    #[serde(rename = "agentId")]
    pub agent_id: Option<String>,
    pub timeout: Option<u64>,
}

pub async fn run(State(state): State<AppState>, Json(request): Json<RunRequest>) -> impl IntoResponse {
    let timeout_ms = request.timeout.unwrap_or(DEFAULT_TIMEOUT_MS);

    let dispatched = state
        .dispatcher
        .dispatch(request.input, request.agent_id.as_deref(), timeout_ms, None, None)
        .await;

    match dispatched {
        Ok((job_id, run_id, DispatchOutcome::Success { output, logs, metrics })) => Json(json!({
            "success": true,
            "jobId": job_id,
            "runId": run_id,
            "output": output,
            "logs": logs,
            "metrics": metrics,
        }))
        .into_response(),
        Ok((job_id, run_id, DispatchOutcome::Error(error))) => Json(json!({
            "success": false,
            "jobId": job_id,
            "runId": run_id,
            "error": error.message,
        }))
        .into_response(),
        Ok((job_id, run_id, DispatchOutcome::Timeout)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "jobId": job_id,
                "runId": run_id,
                "error": "job timed out waiting for a worker result",
            })),
        )
            .into_response(),
        Err(fault) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": false, "error": fault.to_string() })),
        )
            .into_response(),
    }
}
