// [apps/control-plane/src/errors.rs]
/*!
 * Error kind catalogue (spec.md §7). `DispatchError` and `OrchestratorError`
 * are owned here because they're specific to this binary's composition; the
 * umbrella `ApiError` maps every error kind in the system to the HTTP status
 * spec.md §7 names, grounded in the teacher's `IntoResponse` match-based
 * handlers in `handlers/swarm.rs`.
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use vanguard_ledger::LedgerError;
use vanguard_planning::PlanningError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("NO_IDLE_NODE: no idle worker is available for this request")]
    NoIdleNode,

    #[error("CODEC_FAULT: {0}")]
    Codec(String),

    #[error("INTERNAL: {0}")]
    Internal(String),
}

/// Connection supervisor error kinds (spec.md §4.3, §7).
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("AUTH_TIMEOUT: peer did not authenticate within the deadline")]
    AuthTimeout,

    #[error("AUTH_DENIED: invalid credentials")]
    AuthDenied,

    #[error("NOT_REGISTERED: frame received from a node with no live registration")]
    NotRegistered,

    #[error("MALFORMED_FRAME: {0}")]
    MalformedFrame(String),
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Umbrella error the HTTP handlers convert every owning-crate error into.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("insufficient balance: {required} required, {current_balance} available")]
    InsufficientBalance { required: f64, current_balance: f64 },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InsufficientBalance { required, current_balance } => (
                StatusCode::PAYMENT_REQUIRED,
                Json(json!({
                    "error": "INSUFFICIENT_BALANCE",
                    "required": required,
                    "currentBalance": current_balance,
                })),
            )
                .into_response(),
            ApiError::Ledger(LedgerError::DepositAlreadyProcessed(tx_id)) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("deposit {tx_id} was already processed") })),
            )
                .into_response(),
            ApiError::Ledger(LedgerError::DepositSenderMismatch { tx_id, expected, actual }) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!(
                        "deposit {tx_id} sender {actual} does not match expected {expected}"
                    )
                })),
            )
                .into_response(),
            ApiError::Ledger(other) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": other.to_string() })),
            )
                .into_response(),
            ApiError::Dispatch(DispatchError::NoIdleNode) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "success": false, "error": "No idle nodes available" })),
            )
                .into_response(),
            ApiError::Dispatch(other) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": other.to_string() })),
            )
                .into_response(),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}
