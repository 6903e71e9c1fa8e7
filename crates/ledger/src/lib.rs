/*!
 * [crates/ledger/src/lib.rs]
 * Prepaid balance ledger (spec.md §4.6): per-wallet balances, deposit
 * idempotency, and the atomic deduct-on-success operation the HTTP chat
 * handler relies on to guarantee failed queries never charge a user.
 *
 * Grounded in the teacher's `prospector-domain-billing` crate for the
 * "nominal purity" struct-naming convention, generalized from a read-only
 * quota snapshot into the mutable, durable ledger this spec mandates.
 */

pub mod errors;
pub mod persistence;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use vanguard_models::UserBalance;

pub use errors::LedgerError;

/// Outcome of a confirmed on-chain deposit, as reported by whatever backend
/// implements [`DepositVerifier`]. The ledger trusts this value verbatim;
/// it does not re-derive it.
#[derive(Debug, Clone)]
pub struct VerifiedDeposit {
    pub amount: f64,
    pub sender: String,
}

/// Narrow capability the ledger needs from the external settlement backend:
/// confirm that `tx_id` is a settled value transfer to the platform wallet
/// and report its sender and amount. Kept separate from the full
/// `SettlementBackend` trait (crates/settlement) so the ledger crate never
/// depends on the settlement crate — only the control-plane composition
/// root wires a concrete backend into both.
#[async_trait]
pub trait DepositVerifier: Send + Sync {
    async fn verify_deposit(&self, tx_id: &str) -> Result<VerifiedDeposit, LedgerError>;
}

struct LedgerInner {
    balances: HashMap<String, UserBalance>,
    processed_deposits: HashSet<String>,
}

/// Thread-safe, durable prepaid balance ledger. A single writer lock guards
/// both the balance map and the processed-deposit set; mutation happens
/// under the lock, persistence happens after release, matching the locking
/// discipline of spec.md §5.
pub struct BalanceLedger {
    data_dir: PathBuf,
    inner: Mutex<LedgerInner>,
}

impl BalanceLedger {
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Arc<Self>, LedgerError> {
        let data_dir = data_dir.into();
        let balances = persistence::load_balances(&data_dir).await?;
        let processed_deposits = persistence::load_processed_deposits(&data_dir).await?;

        info!(
            wallets = balances.len(),
            deposits = processed_deposits.len(),
            "balance ledger hydrated from disk"
        );

        Ok(Arc::new(Self {
            data_dir,
            inner: Mutex::new(LedgerInner {
                balances,
                processed_deposits,
            }),
        }))
    }

    pub async fn get_balance(&self, wallet: &str) -> Option<UserBalance> {
        let wallet = wallet.to_lowercase();
        self.inner.lock().await.balances.get(&wallet).cloned()
    }

    /// Snapshot of every known wallet's balance, used by the read-only
    /// `/api/transactions` view.
    pub async fn all_balances(&self) -> Vec<UserBalance> {
        self.inner.lock().await.balances.values().cloned().collect()
    }

    pub async fn get_or_create(&self, wallet: &str) -> UserBalance {
        let wallet = wallet.to_lowercase();
        let mut guard = self.inner.lock().await;
        guard
            .balances
            .entry(wallet.clone())
            .or_insert_with(|| UserBalance::new(wallet))
            .clone()
    }

    pub async fn has_enough(&self, wallet: &str, amount: f64) -> bool {
        self.get_or_create(wallet).await.balance >= amount
    }

    /// The atomic deduction point of spec.md §4.6: if the balance is
    /// insufficient the call returns `false` and nothing is mutated;
    /// otherwise the balance is debited and durably persisted before
    /// returning `true`. The caller (HTTP chat handler) must only invoke
    /// this after confirming the orchestrator produced at least one
    /// non-error agent result, so a failed query never reaches here.
    #[instrument(skip(self))]
    pub async fn deduct(&self, wallet: &str, amount: f64) -> Result<bool, LedgerError> {
        let wallet = wallet.to_lowercase();
        let snapshot = {
            let mut guard = self.inner.lock().await;
            let entry = guard
                .balances
                .entry(wallet.clone())
                .or_insert_with(|| UserBalance::new(wallet.clone()));

            if entry.balance < amount {
                return Ok(false);
            }

            entry.balance -= amount;
            entry.total_spent += amount;
            entry.last_activity = chrono::Utc::now();
            entry.debug_assert_consistent();
            guard.balances.clone()
        };

        persistence::persist_balances(&self.data_dir, &snapshot).await?;
        Ok(true)
    }

    /// Credits `amount` to `wallet` unconditionally, optionally recording a
    /// deposit transaction id in the history. Used both for deposits and for
    /// in-memory settlement payouts to agent wallets.
    #[instrument(skip(self))]
    pub async fn credit(&self, wallet: &str, amount: f64, tx_id: Option<&str>) -> Result<(), LedgerError> {
        let wallet = wallet.to_lowercase();
        let snapshot = {
            let mut guard = self.inner.lock().await;
            let entry = guard
                .balances
                .entry(wallet.clone())
                .or_insert_with(|| UserBalance::new(wallet.clone()));

            entry.balance += amount;
            entry.total_deposited += amount;
            entry.last_activity = chrono::Utc::now();
            if let Some(tx_id) = tx_id {
                entry.deposit_history.push(vanguard_models::DepositRecord {
                    tx_id: tx_id.to_string(),
                    amount,
                    credited_at: entry.last_activity,
                });
            }
            entry.debug_assert_consistent();
            guard.balances.clone()
        };

        persistence::persist_balances(&self.data_dir, &snapshot).await?;
        Ok(())
    }

    /// Verifies a deposit transaction against the external settlement
    /// backend and, if it is genuinely new, credits it atomically with the
    /// idempotency set (spec.md §4.6, §8 "Deposit idempotency"). Adding the
    /// transaction id to the processed set is the sole gate on crediting —
    /// a replayed `tx_id` short-circuits before any balance mutation.
    #[instrument(skip(self, verifier))]
    pub async fn verify_and_credit(
        &self,
        verifier: &dyn DepositVerifier,
        tx_id: &str,
        expected_from: &str,
    ) -> Result<f64, LedgerError> {
        {
            let guard = self.inner.lock().await;
            if guard.processed_deposits.contains(tx_id) {
                return Err(LedgerError::DepositAlreadyProcessed(tx_id.to_string()));
            }
        }

        let verified = verifier.verify_deposit(tx_id).await?;

        if !verified.sender.eq_ignore_ascii_case(expected_from) {
            return Err(LedgerError::DepositSenderMismatch {
                tx_id: tx_id.to_string(),
                expected: expected_from.to_string(),
                actual: verified.sender,
            });
        }

        let (balances_snapshot, deposits_snapshot) = {
            let mut guard = self.inner.lock().await;
            if guard.processed_deposits.contains(tx_id) {
                return Err(LedgerError::DepositAlreadyProcessed(tx_id.to_string()));
            }
            guard.processed_deposits.insert(tx_id.to_string());

            let wallet = expected_from.to_lowercase();
            let entry = guard
                .balances
                .entry(wallet.clone())
                .or_insert_with(|| UserBalance::new(wallet));
            entry.balance += verified.amount;
            entry.total_deposited += verified.amount;
            entry.last_activity = chrono::Utc::now();
            entry.deposit_history.push(vanguard_models::DepositRecord {
                tx_id: tx_id.to_string(),
                amount: verified.amount,
                credited_at: entry.last_activity,
            });
            entry.debug_assert_consistent();

            (guard.balances.clone(), guard.processed_deposits.clone())
        };

        if let Err(persistence_fault) = persistence::persist_processed_deposits(&self.data_dir, &deposits_snapshot).await {
            warn!(%tx_id, error = %persistence_fault, "failed to persist processed-deposit set after credit");
        }
        persistence::persist_balances(&self.data_dir, &balances_snapshot).await?;

        Ok(verified.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticVerifier {
        amount: f64,
        sender: String,
    }

    #[async_trait]
    impl DepositVerifier for StaticVerifier {
        async fn verify_deposit(&self, _tx_id: &str) -> Result<VerifiedDeposit, LedgerError> {
            Ok(VerifiedDeposit {
                amount: self.amount,
                sender: self.sender.clone(),
            })
        }
    }

    #[tokio::test]
    async fn deduct_fails_closed_on_insufficient_balance() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = BalanceLedger::open(dir.path()).await.unwrap();
        ledger.credit("0xabc", 0.05, None).await.unwrap();

        let deducted = ledger.deduct("0xabc", 0.10).await.unwrap();
        assert!(!deducted);

        let balance = ledger.get_balance("0xabc").await.unwrap();
        assert_eq!(balance.balance, 0.05);
    }

    #[tokio::test]
    async fn deposit_replay_credits_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = BalanceLedger::open(dir.path()).await.unwrap();
        let verifier = StaticVerifier {
            amount: 1.0,
            sender: "0xUserA".to_string(),
        };

        let first = ledger.verify_and_credit(&verifier, "0xabc", "0xUserA").await.unwrap();
        assert_eq!(first, 1.0);

        let second = ledger.verify_and_credit(&verifier, "0xabc", "0xUserA").await;
        assert!(matches!(second, Err(LedgerError::DepositAlreadyProcessed(_))));

        let balance = ledger.get_balance("0xUserA").await.unwrap();
        assert_eq!(balance.balance, 1.0);
    }

    #[tokio::test]
    async fn deduct_then_credit_restores_prior_balance() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = BalanceLedger::open(dir.path()).await.unwrap();
        ledger.credit("0xabc", 1.0, None).await.unwrap();

        ledger.deduct("0xabc", 0.3).await.unwrap();
        ledger.credit("0xabc", 0.3, None).await.unwrap();

        let balance = ledger.get_balance("0xabc").await.unwrap();
        assert!((balance.balance - 1.0).abs() < 1e-9);
    }
}
