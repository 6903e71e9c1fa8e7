// [apps/control-plane/src/state/mod.rs]
/*!
 * Application state composition root (spec.md §9: "replace global mutable
 * singletons by explicit components constructed in a composition root and
 * passed by capability to handlers"). Locking order registry < queue <
 * ledger (spec.md §5) is enforced by construction: no function in this
 * binary holds a queue lock while calling into the ledger, and no function
 * holds a registry lock while calling into the queue.
 */

pub mod dispatcher;
pub mod monitor;
pub mod queue;
pub mod registry;

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;
use vanguard_agents::LocalToolDispatcher;
use vanguard_ledger::BalanceLedger;
use vanguard_models::{AgentDefinition, PaymentDistribution};
use vanguard_planning::{IntentPlanner, ToolPlanner};
use vanguard_settlement::{SettlementBackend, SettlementDistributor};

use crate::config::ControlPlaneConfig;
use dispatcher::JobDispatcher;
use monitor::Monitor;
use queue::JobQueue;
use registry::NodeRegistry;

/// Bound on the in-memory payment-distribution history exposed by
/// `/api/payments` (spec.md §4.9). Not durable: persistence beyond the
/// ledger files is an explicit Non-goal.
const PAYMENT_HISTORY_CAPACITY: usize = 500;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ControlPlaneConfig>,
    pub registry: Arc<NodeRegistry>,
    pub queue: Arc<JobQueue>,
    pub dispatcher: Arc<JobDispatcher>,
    pub monitor: Arc<Monitor>,
    pub ledger: Arc<BalanceLedger>,
    pub settlement: Arc<SettlementDistributor>,
    /// Same backend `settlement` dispatches transfers through, held here too
    /// so `/api/deposit` can verify an inbound transaction via the
    /// `SettlementBackend -> DepositVerifier` blanket adapter without the
    /// ledger crate depending on the settlement crate.
    pub deposit_backend: Arc<dyn SettlementBackend>,
    pub planner: Arc<dyn IntentPlanner>,
    pub tool_planner: Arc<dyn ToolPlanner>,
    pub local_tools: Arc<LocalToolDispatcher>,
    pub agent_catalogue: Arc<RwLock<Vec<AgentDefinition>>>,
    payments: Arc<RwLock<VecDeque<PaymentDistribution>>>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<ControlPlaneConfig>,
        ledger: Arc<BalanceLedger>,
        settlement: Arc<SettlementDistributor>,
        deposit_backend: Arc<dyn SettlementBackend>,
        planner: Arc<dyn IntentPlanner>,
        tool_planner: Arc<dyn ToolPlanner>,
    ) -> Self {
        let registry = NodeRegistry::new();
        Self {
            config,
            registry: registry.clone(),
            queue: JobQueue::new(),
            dispatcher: JobDispatcher::new(registry),
            monitor: Monitor::new(),
            ledger,
            settlement,
            deposit_backend,
            planner,
            tool_planner,
            local_tools: Arc::new(LocalToolDispatcher::with_stock_tools()),
            agent_catalogue: Arc::new(RwLock::new(vanguard_agents::stock_catalogue())),
            payments: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    pub async fn catalogue_snapshot(&self) -> Vec<AgentDefinition> {
        self.agent_catalogue.read().await.clone()
    }

    pub async fn record_payment(&self, distribution: PaymentDistribution) {
        let mut guard = self.payments.write().await;
        if guard.len() >= PAYMENT_HISTORY_CAPACITY {
            guard.pop_front();
        }
        guard.push_back(distribution);
    }

    pub async fn recent_payments(&self) -> Vec<PaymentDistribution> {
        self.payments.read().await.iter().cloned().collect()
    }
}
