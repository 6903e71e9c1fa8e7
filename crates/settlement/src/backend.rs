// [crates/settlement/src/backend.rs]
/*!
 * `SettlementBackend` models the out-of-scope on-chain/RPC facilitator
 * (spec.md §1) as a narrow external capability: verify a deposit
 * transaction and transfer funds to an agent wallet. Two implementations
 * are provided — an in-memory one used when `ONCHAIN_DISTRIBUTION=false`,
 * and an HTTP one grounded in the teacher's `BitcoinNetworkUplinkClient`
 * (`libs/infra/blockchain-client`), generalized from a read-only balance
 * fetch into a transfer-capable client against `SETTLEMENT_RPC_URL` /
 * `SETTLEMENT_BACKEND_URL`.
 */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use vanguard_ledger::{DepositVerifier, LedgerError, VerifiedDeposit};

use crate::errors::SettlementError;

/// Outcome of one attempted on-chain (or internal) transfer.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub succeeded: bool,
    pub external_tx_id: Option<String>,
    pub failure_reason: Option<String>,
}

#[async_trait]
pub trait SettlementBackend: Send + Sync {
    /// Confirms `tx_id` is a settled value transfer to the platform wallet
    /// and reports its sender and amount.
    async fn verify_deposit(&self, tx_id: &str) -> Result<VerifiedDeposit, SettlementError>;

    /// Transfers `amount` to `address`, returning an external transaction id
    /// on success. A failure here is recorded per-agent and never rolled
    /// back or refunded (spec.md §4.7, §7).
    async fn transfer(&self, address: &str, amount: f64) -> Result<TransferOutcome, SettlementError>;
}

/// Adapter so any `SettlementBackend` also satisfies the ledger's narrower
/// `DepositVerifier` capability, without the ledger crate depending on this
/// one.
#[async_trait]
impl<T: SettlementBackend + ?Sized> DepositVerifier for T {
    async fn verify_deposit(&self, tx_id: &str) -> Result<VerifiedDeposit, LedgerError> {
        SettlementBackend::verify_deposit(self, tx_id)
            .await
            .map_err(|fault| LedgerError::BackendFault(fault.to_string()))
    }
}

/// In-memory settlement used when on-chain distribution is disabled.
/// Credits are tracked purely for observability; no external call is made.
pub struct InternalSettlementBackend {
    credited: Mutex<Vec<(String, f64)>>,
}

impl InternalSettlementBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            credited: Mutex::new(Vec::new()),
        })
    }
}

impl Default for InternalSettlementBackend {
    fn default() -> Self {
        Self {
            credited: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SettlementBackend for InternalSettlementBackend {
    async fn verify_deposit(&self, _tx_id: &str) -> Result<VerifiedDeposit, SettlementError> {
        Err(SettlementError::ProviderRejection(
            "internal backend cannot verify on-chain deposits".to_string(),
        ))
    }

    async fn transfer(&self, address: &str, amount: f64) -> Result<TransferOutcome, SettlementError> {
        self.credited.lock().await.push((address.to_string(), amount));
        info!(%address, amount, "internal settlement credit recorded");
        Ok(TransferOutcome {
            succeeded: true,
            external_tx_id: None,
            failure_reason: None,
        })
    }
}

#[derive(Deserialize)]
struct RpcVerifyResponse {
    confirmed: bool,
    sender: String,
    amount: f64,
    #[serde(default)]
    to_platform_wallet: bool,
}

#[derive(Serialize)]
struct RpcTransferRequest<'a> {
    address: &'a str,
    amount: f64,
}

#[derive(Deserialize)]
struct RpcTransferResponse {
    success: bool,
    #[serde(default)]
    tx_id: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// On-chain/RPC facilitator client used when `ONCHAIN_DISTRIBUTION=true`.
pub struct OnChainSettlementBackend {
    http: Client,
    rpc_url: String,
    platform_wallet: String,
}

impl OnChainSettlementBackend {
    pub fn new(rpc_url: String, platform_wallet: String) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(15))
                .user_agent("Vanguard-Settlement-Uplink/1.0")
                .build()
                .expect("CRITICAL: failed to initialize settlement HTTP client"),
            rpc_url: rpc_url.trim_end_matches('/').to_string(),
            platform_wallet,
        }
    }
}

#[async_trait]
impl SettlementBackend for OnChainSettlementBackend {
    async fn verify_deposit(&self, tx_id: &str) -> Result<VerifiedDeposit, SettlementError> {
        let url = format!("{}/tx/{}", self.rpc_url, tx_id);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SettlementError::ProviderRejection(format!(
                "HTTP_{}",
                response.status()
            )));
        }

        let payload: RpcVerifyResponse = response.json().await?;

        if !payload.confirmed || !payload.to_platform_wallet {
            return Err(SettlementError::ProviderRejection(format!(
                "transaction {} is not a confirmed transfer to {}",
                tx_id, self.platform_wallet
            )));
        }

        Ok(VerifiedDeposit {
            amount: payload.amount,
            sender: payload.sender,
        })
    }

    async fn transfer(&self, address: &str, amount: f64) -> Result<TransferOutcome, SettlementError> {
        let url = format!("{}/transfer", self.rpc_url);
        let response = self
            .http
            .post(&url)
            .json(&RpcTransferRequest { address, amount })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(%address, amount, status = %response.status(), "settlement transfer rejected by backend");
            return Ok(TransferOutcome {
                succeeded: false,
                external_tx_id: None,
                failure_reason: Some(format!("HTTP_{}", response.status())),
            });
        }

        let payload: RpcTransferResponse = response.json().await?;
        Ok(TransferOutcome {
            succeeded: payload.success,
            external_tx_id: payload.tx_id,
            failure_reason: payload.reason,
        })
    }
}
