// [apps/control-plane/src/handlers/balance.rs]
//! `GET /api/balance?wallet=…` (spec.md §4.9, §6).

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub wallet: String,
}

pub async fn balance(State(state): State<AppState>, Query(query): Query<BalanceQuery>) -> impl IntoResponse {
    let wallet = state.ledger.get_or_create(&query.wallet).await;
    let query_price = state.config.query_price_usdc;
    let queries_remaining = if query_price > 0.0 {
        (wallet.balance / query_price).floor() as i64
    } else {
        i64::MAX
    };

    Json(json!({
        "wallet": wallet.wallet,
        "balance": wallet.balance,
        "totalDeposited": wallet.total_deposited,
        "totalSpent": wallet.total_spent,
        "queryPrice": query_price,
        "queriesRemaining": queries_remaining,
    }))
}
