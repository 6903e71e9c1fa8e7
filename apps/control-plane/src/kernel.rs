// [apps/control-plane/src/kernel.rs]
/*!
 * Composition root (spec.md §9: "replace global mutable singletons by
 * explicit components constructed in a composition root and passed by
 * capability to handlers"). Grounded in the teacher's
 * `OrchestratorKernel::ignite` / `launch_sovereign_operations` split: one
 * method assembles the dependency graph, the other spawns daemons and
 * blocks on the listeners.
 */

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument};
use vanguard_ledger::BalanceLedger;
use vanguard_planning::HttpPlanner;
use vanguard_settlement::{InternalSettlementBackend, OnChainSettlementBackend, SettlementBackend, SettlementDistributor};

use crate::config::ControlPlaneConfig;
use crate::routes::{build_http_router, build_worker_router};
use crate::state::AppState;

/// How often the stale-node and job-timeout scanners run (spec.md §4.2, §4.5).
const SCANNER_INTERVAL: Duration = Duration::from_secs(5);

pub struct ControlPlaneKernel {
    config: Arc<ControlPlaneConfig>,
    state: AppState,
}

impl ControlPlaneKernel {
    /// Builds the full dependency graph: ledger, settlement backend/distributor,
    /// planner, and the shared [`AppState`]. Fails fast (panics with a
    /// `CRITICAL:`-prefixed message) on unrecoverable startup errors, matching
    /// the teacher's `expect`-heavy ignition style.
    #[instrument(skip_all)]
    pub async fn ignite(config: ControlPlaneConfig) -> Self {
        let config = Arc::new(config);

        let ledger = BalanceLedger::open(&config.data_dir)
            .await
            .expect("CRITICAL: failed to open balance ledger from DATA_DIR");

        let backend: Arc<dyn SettlementBackend> = if config.onchain_distribution {
            let rpc_url = config
                .settlement_rpc_url
                .clone()
                .expect("CRITICAL: SETTLEMENT_RPC_URL must be set when ONCHAIN_DISTRIBUTION=true");
            Arc::new(OnChainSettlementBackend::new(rpc_url, config.platform_wallet.clone()))
        } else {
            InternalSettlementBackend::new()
        };

        let settlement = Arc::new(SettlementDistributor::new(backend.clone(), config.onchain_distribution));
        let planner = Arc::new(HttpPlanner::new(config.planner_base_url.clone()));

        let state = AppState::new(
            config.clone(),
            ledger,
            settlement,
            backend,
            planner.clone(),
            planner,
        );

        info!(data_dir = %config.data_dir, onchain = config.onchain_distribution, "control plane ignited");

        Self { config, state }
    }

    /// Spawns the background scanners and blocks on both listeners (worker
    /// socket and public HTTP API) until either one fails.
    pub async fn launch(self) {
        spawn_stale_node_sweeper(self.state.clone());
        spawn_job_timeout_sweeper(self.state.clone());

        let worker_router = build_worker_router(self.state.clone());
        let http_router = build_http_router(self.state.clone());

        let worker_addr = SocketAddr::new(
            self.config.control_plane_host.parse::<IpAddr>().unwrap_or([0, 0, 0, 0].into()),
            self.config.control_plane_port,
        );
        let http_addr = SocketAddr::new([0, 0, 0, 0].into(), self.config.http_port);

        info!(%worker_addr, "worker duplex socket listening");
        info!(%http_addr, "public HTTP API listening");

        let worker_listener = tokio::net::TcpListener::bind(worker_addr)
            .await
            .expect("CRITICAL: failed to bind the worker socket listener");
        let http_listener = tokio::net::TcpListener::bind(http_addr)
            .await
            .expect("CRITICAL: failed to bind the HTTP API listener");

        let worker_server = axum::serve(worker_listener, worker_router).with_graceful_shutdown(shutdown_signal());
        let http_server = axum::serve(http_listener, http_router).with_graceful_shutdown(shutdown_signal());

        let (worker_result, http_result) = tokio::join!(worker_server, http_server);

        if let Err(fault) = worker_result {
            error!(error = %fault, "worker socket listener failed");
        }
        if let Err(fault) = http_result {
            error!(error = %fault, "HTTP API listener failed");
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("SIGINT received, shutting down gracefully");
}

fn spawn_stale_node_sweeper(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SCANNER_INTERVAL);
        loop {
            ticker.tick().await;
            let evicted = state.registry.sweep_stale().await;
            for (node_id, channel) in evicted {
                state.monitor.record_connection(&node_id, vanguard_models::ConnectionEventKind::Disconnected).await;
                drop(channel);
            }
        }
    });
}

fn spawn_job_timeout_sweeper(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SCANNER_INTERVAL);
        loop {
            ticker.tick().await;
            state.queue.sweep_timeouts().await;
        }
    });
}
