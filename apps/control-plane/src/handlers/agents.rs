// [apps/control-plane/src/handlers/agents.rs]
//! `/api/agents[/:id]` CRUD over the in-memory agent catalogue (spec.md
//! §4.9). The stock catalogue seeds `AppState::agent_catalogue`; these
//! handlers let an operator extend or edit it at runtime.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use vanguard_models::AgentDefinition;

use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "agents": state.catalogue_snapshot().await }))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.catalogue_snapshot().await.into_iter().find(|agent| agent.id == id) {
        Some(agent) => Json(agent).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": format!("no agent with id {id}") }))).into_response(),
    }
}

pub async fn create(State(state): State<AppState>, Json(agent): Json<AgentDefinition>) -> impl IntoResponse {
    let mut catalogue = state.agent_catalogue.write().await;
    if catalogue.iter().any(|existing| existing.id == agent.id) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("agent {} already exists", agent.id) })),
        )
            .into_response();
    }
    catalogue.push(agent.clone());
    (StatusCode::CREATED, Json(agent)).into_response()
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<AgentDefinition>,
) -> impl IntoResponse {
    let mut catalogue = state.agent_catalogue.write().await;
    match catalogue.iter_mut().find(|existing| existing.id == id) {
        Some(slot) => {
            *slot = update.clone();
            Json(update).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": format!("no agent with id {id}") }))).into_response(),
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let mut catalogue = state.agent_catalogue.write().await;
    let before = catalogue.len();
    catalogue.retain(|agent| agent.id != id);
    if catalogue.len() == before {
        (StatusCode::NOT_FOUND, Json(json!({ "error": format!("no agent with id {id}") }))).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}
