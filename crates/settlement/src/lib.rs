/*!
 * [crates/settlement/src/lib.rs]
 * Settlement distributor and `SettlementBackend` capability (spec.md §4.7).
 * Grounded in the teacher's `prospector-blockchain-client` crate, which this
 * spec generalizes from a read-only Bitcoin balance lookup into a
 * transfer-capable facilitator client.
 */

pub mod backend;
pub mod distributor;
pub mod errors;

pub use backend::{InternalSettlementBackend, OnChainSettlementBackend, SettlementBackend, TransferOutcome};
pub use distributor::{SettlementDistributor, DEFAULT_ORCHESTRATOR_SHARE};
pub use errors::SettlementError;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn distribute_splits_total_between_platform_and_agents() {
        let backend = InternalSettlementBackend::new();
        let distributor = SettlementDistributor::new(backend, false);

        let agents = vec![
            ("travel-planner".to_string(), Some("wallet-a".to_string())),
            ("budget-planner".to_string(), Some("wallet-b".to_string())),
        ];

        let distribution = distributor.distribute(0.10, &agents).await;

        assert!((distribution.orchestrator_amount - 0.05).abs() < 1e-9);
        assert_eq!(distribution.agent_payments.len(), 2);
        for payment in &distribution.agent_payments {
            assert!((payment.amount - 0.025).abs() < 1e-9);
            assert!(payment.succeeded);
        }
    }

    #[tokio::test]
    async fn distribute_defaults_to_single_agent_when_list_is_empty() {
        let backend: Arc<dyn SettlementBackend> = InternalSettlementBackend::new();
        let distributor = SettlementDistributor::new(backend, false);

        let distribution = distributor.distribute(1.0, &[]).await;

        assert!((distribution.orchestrator_amount - 0.5).abs() < 1e-9);
        assert!(distribution.agent_payments.is_empty());
    }
}
