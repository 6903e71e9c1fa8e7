// [apps/control-plane/src/handlers/deposit.rs]
//! `POST /api/deposit` (spec.md §4.6, §4.9, §6).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    #[serde(rename = "txHash")]
    pub tx_hash: String,
    pub wallet: String,
}

pub async fn deposit(State(state): State<AppState>, Json(request): Json<DepositRequest>) -> impl IntoResponse {
    let outcome = state
        .ledger
        .verify_and_credit(state.deposit_backend.as_ref(), &request.tx_hash, &request.wallet)
        .await;

    match outcome {
        Ok(deposited) => {
            let new_balance = state.ledger.get_balance(&request.wallet).await.map(|balance| balance.balance);
            Json(json!({
                "success": true,
                "deposited": deposited,
                "newBalance": new_balance,
            }))
            .into_response()
        }
        Err(fault) => ApiError::Ledger(fault).into_response(),
    }
}
