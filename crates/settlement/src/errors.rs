// [crates/settlement/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("ONCHAIN_FAILURE: transfer to {address} for {amount} failed: {reason}")]
    OnChainFailure {
        address: String,
        amount: f64,
        reason: String,
    },

    #[error("PROVIDER_UNREACHABLE: {0}")]
    ProviderUnreachable(#[from] reqwest::Error),

    #[error("PROVIDER_REJECTION: {0}")]
    ProviderRejection(String),
}
