// [apps/worker-node/src/main.rs]
/*!
 * Worker binary entry point. Parses `WorkerConfig` (clap derive + env),
 * initializes tracing, and hands off to the duplex connection loop.
 * Grounded in the teacher's `apps/miner-worker/src/main.rs` shell: parse
 * directives, arm ctrl-c, ignite the engine, block until shutdown.
 */

use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn};
use vanguard_worker_node::config::WorkerConfig;
use vanguard_worker_node::connection;

#[tokio::main]
async fn main() {
    dotenv().ok();
    vanguard_telemetry::init_tracing("vanguard-worker-node");

    let config = WorkerConfig::parse();
    let node_id = config.resolved_node_id();
    info!(%node_id, url = %config.control_plane_url, "worker node starting");

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("SIGINT received, worker node shutting down");
            std::process::exit(0);
        }
    });

    connection::run_forever(config).await;
}
