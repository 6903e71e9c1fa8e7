// [apps/control-plane/src/handlers/payments.rs]
//! `GET /api/payments`, `GET /api/transactions` (spec.md §4.9). Read-only
//! views over the in-memory payment-distribution history and the ledger's
//! per-wallet deposit histories.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn payments(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "payments": state.recent_payments().await }))
}

pub async fn transactions(State(state): State<AppState>) -> impl IntoResponse {
    let balances = state.ledger.all_balances().await;
    let transactions: Vec<_> = balances
        .iter()
        .flat_map(|balance| {
            balance.deposit_history.iter().map(move |deposit| {
                json!({
                    "wallet": balance.wallet,
                    "txId": deposit.tx_id,
                    "amount": deposit.amount,
                    "creditedAt": deposit.credited_at,
                })
            })
        })
        .collect();

    Json(json!({ "transactions": transactions }))
}
