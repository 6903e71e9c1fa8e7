// [crates/settlement/src/distributor.rs]
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use vanguard_models::{AgentPayment, PaymentDistribution};

use crate::backend::SettlementBackend;

/// Default split of a settled query's price between the platform and the
/// participating agents (spec.md §4.7).
pub const DEFAULT_ORCHESTRATOR_SHARE: f64 = 0.5;

/// Nonce-hygiene delay between consecutive on-chain transfer calls, mirroring
/// the teacher's inter-call pacing for on-chain operations.
const ONCHAIN_INTER_CALL_DELAY: Duration = Duration::from_millis(250);

pub struct SettlementDistributor {
    backend: Arc<dyn SettlementBackend>,
    on_chain: bool,
    orchestrator_share: f64,
}

impl SettlementDistributor {
    pub fn new(backend: Arc<dyn SettlementBackend>, on_chain: bool) -> Self {
        Self {
            backend,
            on_chain,
            orchestrator_share: DEFAULT_ORCHESTRATOR_SHARE,
        }
    }

    pub fn with_orchestrator_share(mut self, share: f64) -> Self {
        self.orchestrator_share = share;
        self
    }

    /// Splits `total` between the platform and `agent_wallets`, transferring
    /// (or internally crediting) each agent's share. A per-agent transfer
    /// failure is recorded on that agent's `AgentPayment` and does not roll
    /// back prior transfers or refund the user (spec.md §4.7, §7).
    pub async fn distribute(
        &self,
        total: f64,
        agent_wallets: &[(String, Option<String>)],
    ) -> PaymentDistribution {
        let orchestrator_amount = total * self.orchestrator_share;
        let agent_share_total = total - orchestrator_amount;
        let per_agent = agent_share_total / (agent_wallets.len().max(1) as f64);

        let mut distribution = PaymentDistribution::new(total, orchestrator_amount, self.on_chain);

        for (index, (agent_id, address)) in agent_wallets.iter().enumerate() {
            if index > 0 && self.on_chain {
                tokio::time::sleep(ONCHAIN_INTER_CALL_DELAY).await;
            }

            let payment = match address {
                Some(address) => self.settle_one_agent(agent_id, address, per_agent).await,
                None => AgentPayment {
                    agent_id: agent_id.clone(),
                    address: None,
                    amount: per_agent,
                    external_tx_id: None,
                    succeeded: true,
                },
            };

            distribution.agent_payments.push(payment);
        }

        info!(
            total,
            orchestrator_amount,
            agents = distribution.agent_payments.len(),
            on_chain = self.on_chain,
            "settlement distribution recorded"
        );

        distribution
    }

    async fn settle_one_agent(&self, agent_id: &str, address: &str, amount: f64) -> AgentPayment {
        match self.backend.transfer(address, amount).await {
            Ok(outcome) => AgentPayment {
                agent_id: agent_id.to_string(),
                address: Some(address.to_string()),
                amount,
                external_tx_id: outcome.external_tx_id,
                succeeded: outcome.succeeded,
            },
            Err(fault) => {
                warn!(%agent_id, %address, error = %fault, "settlement transfer failed, recording and continuing");
                AgentPayment {
                    agent_id: agent_id.to_string(),
                    address: Some(address.to_string()),
                    amount,
                    external_tx_id: None,
                    succeeded: false,
                }
            }
        }
    }
}
