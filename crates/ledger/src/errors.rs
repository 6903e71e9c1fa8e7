// [crates/ledger/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("INSUFFICIENT_BALANCE: wallet {wallet} has {available} available, {required} required")]
    InsufficientBalance {
        wallet: String,
        available: f64,
        required: f64,
    },

    #[error("DEPOSIT_ALREADY_PROCESSED: transaction {0} was already credited")]
    DepositAlreadyProcessed(String),

    #[error("DEPOSIT_SENDER_MISMATCH: transaction {tx_id} sender {actual} does not match expected {expected}")]
    DepositSenderMismatch {
        tx_id: String,
        expected: String,
        actual: String,
    },

    #[error("DEPOSIT_NOT_CONFIRMED: transaction {0} is not yet confirmed on-chain")]
    DepositNotConfirmed(String),

    #[error("SETTLEMENT_BACKEND_FAULT: {0}")]
    BackendFault(String),

    #[error("PERSISTENCE_FAULT: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("SERIALIZATION_FAULT: {0}")]
    Serialization(#[from] serde_json::Error),
}
