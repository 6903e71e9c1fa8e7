// [apps/control-plane/src/handlers/chat.rs]
/*!
 * `POST /api/chat` (spec.md §4.6-§4.9): the orchestrated, billed query
 * endpoint. Balance check (no deduct) -> orchestrator.execute -> on a
 * charged result, deduct then distribute -> respond. A failed query
 * (orchestrator exception, or every agent erroring) never reaches the
 * ledger.
 */

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::errors::ApiError;
use crate::orchestrator;
use crate::state::AppState;

const WALLET_HEADER: &str = "x-wallet-address";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

pub async fn chat(State(state): State<AppState>, headers: HeaderMap, Json(request): Json<ChatRequest>) -> impl IntoResponse {
    let wallet = match headers.get(WALLET_HEADER).and_then(|value| value.to_str().ok()) {
        Some(wallet) if !wallet.is_empty() => wallet.to_string(),
        _ => return ApiError::BadRequest(format!("missing {WALLET_HEADER} header")).into_response(),
    };

    let query_price = state.config.query_price_usdc;

    if state.config.x402_enabled {
        let balance = state.ledger.get_or_create(&wallet).await;
        if balance.balance < query_price {
            return ApiError::InsufficientBalance {
                required: query_price,
                current_balance: balance.balance,
            }
            .into_response();
        }
    }

    let response = orchestrator::execute(&state, &request.message).await;
    let query_hash = hash_query(&wallet, &request.message);

    if !response.charged() {
        return Json(json!({
            "success": true,
            "message": response.message,
            "agentsUsed": response.agents_used,
            "queryHash": query_hash,
            "agentResults": response.agent_results,
        }))
        .into_response();
    }

    if !state.config.x402_enabled {
        return Json(json!({
            "success": true,
            "message": response.message,
            "agentsUsed": response.agents_used,
            "queryHash": query_hash,
            "agentResults": response.agent_results,
        }))
        .into_response();
    }

    let deducted = match state.ledger.deduct(&wallet, query_price).await {
        Ok(deducted) => deducted,
        Err(fault) => return ApiError::Ledger(fault).into_response(),
    };

    if !deducted {
        let balance = state.ledger.get_or_create(&wallet).await;
        return ApiError::InsufficientBalance {
            required: query_price,
            current_balance: balance.balance,
        }
        .into_response();
    }

    let agent_wallets: Vec<(String, Option<String>)> =
        response.agents_used.iter().map(|agent_id| (agent_id.clone(), None)).collect();
    let distribution = state.settlement.distribute(query_price, &agent_wallets).await;

    // In internal mode `distribute` records a `None`-address payment per agent
    // but performs no transfer of its own; credit each agent's in-memory
    // wallet here so the payout actually moves balance (spec.md §4.7).
    for payment in &distribution.agent_payments {
        if payment.succeeded && payment.address.is_none() {
            if let Err(fault) = state.ledger.credit(&payment.agent_id, payment.amount, None).await {
                warn!(agent_id = %payment.agent_id, error = %fault, "failed to credit agent's internal wallet");
            }
        }
    }

    state.record_payment(distribution.clone()).await;

    Json(json!({
        "success": true,
        "message": response.message,
        "agentsUsed": response.agents_used,
        "queryHash": query_hash,
        "agentResults": response.agent_results,
        "payment": distribution,
    }))
    .into_response()
}

/// Deterministic, non-cryptographic fingerprint of one query, used only to
/// let a client correlate a chat response with a later `/api/payments`
/// lookup. Not a security boundary, so `DefaultHasher` is adequate.
fn hash_query(wallet: &str, message: &str) -> String {
    let mut hasher = DefaultHasher::new();
    wallet.hash(&mut hasher);
    message.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
