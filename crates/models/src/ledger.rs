// [crates/models/src/ledger.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record of one credited deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRecord {
    pub tx_id: String,
    pub amount: f64,
    pub credited_at: DateTime<Utc>,
}

/// Prepaid balance for one wallet (spec.md §3). Keyed externally by the
/// lowercased wallet address.
///
/// Invariant: `balance == total_deposited - total_spent`, and `balance`
/// never goes negative. The only mutation surface for this invariant is
/// `vanguard_ledger::BalanceLedger::deduct`/`credit` — this struct itself
/// exposes no public mutators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBalance {
    pub wallet: String,
    pub balance: f64,
    pub total_deposited: f64,
    pub total_spent: f64,
    pub deposit_history: Vec<DepositRecord>,
    pub last_activity: DateTime<Utc>,
}

impl UserBalance {
    pub fn new(wallet: String) -> Self {
        Self {
            wallet,
            balance: 0.0,
            total_deposited: 0.0,
            total_spent: 0.0,
            deposit_history: Vec::new(),
            last_activity: Utc::now(),
        }
    }

    /// Debug-only structural check for the ledger invariant; cheap enough to
    /// call after every mutation without affecting release performance.
    pub fn debug_assert_consistent(&self) {
        debug_assert!(self.balance >= 0.0, "balance went negative for {}", self.wallet);
        debug_assert!(
            (self.balance - (self.total_deposited - self.total_spent)).abs() < 1e-9,
            "balance drifted from total_deposited - total_spent for {}",
            self.wallet
        );
    }
}
