// [apps/worker-node/src/config.rs]
/*!
 * Connection directives for the worker binary, parsed via `clap` (derive +
 * env features) per spec.md §6/§4.1's AUTH payload. Grounded in the
 * teacher's `SovereignWorkerDirectives` (`apps/miner-worker/src/main.rs`):
 * same `#[arg(long, env = ...)]` shape, generalized from three fields to the
 * AUTH frame's full identity/capability set.
 */

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Decentralized agent execution platform — worker node"
)]
pub struct WorkerConfig {
    /// Duplex socket endpoint of the control plane, e.g. `ws://host:7000/ws`.
    #[arg(long, env = "CONTROL_PLANE_URL", default_value = "ws://127.0.0.1:7000/ws")]
    pub control_plane_url: String,

    /// Shared secret verified by the control plane's connection supervisor.
    #[arg(long, env = "NODE_SECRET")]
    pub node_secret: String,

    /// Stable identifier for this node. Defaults to a fresh `worker-<uuid>` if unset.
    #[arg(long, env = "NODE_ID")]
    pub node_id: Option<String>,

    /// Comma-separated capability tokens (e.g. `python-3.11,docker,tool:webSearch`).
    #[arg(long, env = "NODE_CAPABILITIES", value_delimiter = ',', default_value = "shell")]
    pub capabilities: Vec<String>,

    /// Comma-separated agent ids this node is willing to execute.
    #[arg(long, env = "NODE_AGENT_TYPES", value_delimiter = ',')]
    pub agent_types: Vec<String>,

    /// Optional payout wallet for this node's settlement share.
    #[arg(long, env = "NODE_WALLET")]
    pub wallet: Option<String>,

    /// Shell used to run a job's `script` field inside the local sandbox.
    #[arg(long, env = "SANDBOX_SHELL", default_value = "sh")]
    pub sandbox_shell: String,

    /// Upper bound on a job's execution time when the control plane sends no `timeoutMs`.
    #[arg(long, env = "SANDBOX_DEFAULT_TIMEOUT_MS", default_value_t = 30_000)]
    pub default_timeout_ms: u64,
}

impl WorkerConfig {
    pub fn resolved_node_id(&self) -> String {
        self.node_id.clone().unwrap_or_else(|| format!("worker-{}", uuid::Uuid::new_v4()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_capabilities_as_a_comma_separated_list() {
        let config = WorkerConfig::try_parse_from([
            "vanguard-worker-node",
            "--node-secret",
            "s3cr3t",
            "--node-capabilities",
            "python-3.11,docker,tool:webSearch",
        ])
        .expect("valid arguments");

        assert_eq!(config.capabilities, vec!["python-3.11", "docker", "tool:webSearch"]);
    }

    #[test]
    fn falls_back_to_a_generated_node_id_when_unset() {
        let config =
            WorkerConfig::try_parse_from(["vanguard-worker-node", "--node-secret", "s3cr3t"]).expect("valid arguments");

        assert!(config.node_id.is_none());
        assert!(config.resolved_node_id().starts_with("worker-"));
    }
}
