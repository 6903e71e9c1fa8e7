// [apps/control-plane/src/main.rs]
/*!
 * Control plane entry point (spec.md §6). Loads `.env`, initializes
 * tracing, builds a multi-threaded runtime, and hands off to
 * [`vanguard_control_plane::kernel::ControlPlaneKernel`].
 */

use dotenvy::dotenv;
use tracing::info;
use vanguard_control_plane::config::ControlPlaneConfig;
use vanguard_control_plane::kernel::ControlPlaneKernel;

fn main() {
    dotenv().ok();
    vanguard_telemetry::init_tracing("vanguard-control-plane");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_stack_size(4 * 1024 * 1024)
        .build()
        .expect("CRITICAL: failed to build the tokio runtime");

    runtime.block_on(async {
        info!("control plane starting");
        let config = ControlPlaneConfig::from_env();
        let kernel = ControlPlaneKernel::ignite(config).await;
        kernel.launch().await;
    });

    info!("control plane shut down cleanly");
    std::process::exit(0);
}
