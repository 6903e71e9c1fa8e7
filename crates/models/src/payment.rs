// [crates/models/src/payment.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One agent's share of a settled query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPayment {
    pub agent_id: String,
    pub address: Option<String>,
    pub amount: f64,
    pub external_tx_id: Option<String>,
    pub succeeded: bool,
}

/// The post-success split of one query's price between the platform and the
/// agents that produced output (spec.md §3, §4.7). Created only after the
/// corresponding query's balance deduction returned `true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDistribution {
    pub id: String,
    pub total_amount: f64,
    pub orchestrator_amount: f64,
    pub agent_payments: Vec<AgentPayment>,
    pub on_chain: bool,
    pub timestamp: DateTime<Utc>,
}

impl PaymentDistribution {
    pub fn new(total_amount: f64, orchestrator_amount: f64, on_chain: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            total_amount,
            orchestrator_amount,
            agent_payments: Vec::new(),
            on_chain,
            timestamp: Utc::now(),
        }
    }
}
