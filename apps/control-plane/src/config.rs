// [apps/control-plane/src/config.rs]
/*!
 * Runtime configuration, parsed once at boot from the environment variables
 * enumerated in spec.md §6. Generalized from the teacher's direct
 * `env::var` calls in `main.rs` into a struct because the option set here is
 * large enough to warrant one.
 */

use std::env;

#[derive(Debug, Clone)]
pub struct ControlPlaneConfig {
    pub control_plane_host: String,
    pub control_plane_port: u16,
    pub http_port: u16,
    pub node_secret: String,
    pub x402_enabled: bool,
    pub x402_network: String,
    pub query_price_usdc: f64,
    pub platform_wallet: String,
    pub settlement_backend_url: Option<String>,
    pub settlement_rpc_url: Option<String>,
    pub onchain_distribution: bool,
    pub data_dir: String,
    /// Base URL of the HTTP LLM provider backing `HttpPlanner`. Not named in
    /// spec.md §6's environment list (the provider itself is out of scope,
    /// spec.md §1), added here so the ambient HTTP client actually has
    /// somewhere to point.
    pub planner_base_url: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<bool>().ok())
        .unwrap_or(default)
}

impl ControlPlaneConfig {
    /// Reads every setting from the process environment. `NODE_SECRET` and
    /// `PLATFORM_WALLET` have no safe default and are required.
    pub fn from_env() -> Self {
        Self {
            control_plane_host: env_or("CONTROL_PLANE_HOST", "0.0.0.0"),
            control_plane_port: env_or("CONTROL_PLANE_PORT", "7000")
                .parse()
                .unwrap_or(7000),
            http_port: env_or("HTTP_PORT", "8080").parse().unwrap_or(8080),
            node_secret: env::var("NODE_SECRET")
                .expect("CRITICAL: NODE_SECRET must be set for worker authentication"),
            x402_enabled: env_bool("X402_ENABLED", false),
            x402_network: env_or("X402_NETWORK", "base-sepolia"),
            query_price_usdc: env_or("QUERY_PRICE_USDC", "0.10").parse().unwrap_or(0.10),
            platform_wallet: env::var("PLATFORM_WALLET")
                .expect("CRITICAL: PLATFORM_WALLET must be set to receive settlement shares"),
            settlement_backend_url: env::var("SETTLEMENT_BACKEND_URL").ok(),
            settlement_rpc_url: env::var("SETTLEMENT_RPC_URL").ok(),
            onchain_distribution: env_bool("ONCHAIN_DISTRIBUTION", false),
            data_dir: env_or("DATA_DIR", "./data"),
            planner_base_url: env_or("PLANNER_BASE_URL", "http://localhost:9000"),
        }
    }
}
