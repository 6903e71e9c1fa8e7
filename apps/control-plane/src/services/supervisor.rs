// [apps/control-plane/src/services/supervisor.rs]
/*!
 * Connection supervisor logic (spec.md §4.3): the AUTH verification and
 * state-transition decisions a worker socket session drives through. The
 * socket plumbing itself (the triple-task send/receive/process loop) lives
 * in `handlers::socket`, grounded in the teacher's
 * `handlers/stream::handle_active_neural_link`; this module holds the
 * decision logic so it can be unit tested without a live socket.
 */

use std::collections::HashSet;
use std::time::Duration;

use vanguard_protocol::NodeSpecs;

use crate::errors::SupervisorError;

/// Default window a newly connected peer has to send `AUTH` (spec.md §4.3).
pub const AUTH_DEADLINE: Duration = Duration::from_secs(10);
/// Default heartbeat cadence communicated in `AUTH_ACK` (spec.md §4.3 implies
/// a value is sent; the staleness window in §4.2 anchors this default).
pub const HEARTBEAT_INTERVAL_MS: u64 = 10_000;

pub struct AuthRequest {
    pub node_id: String,
    pub capabilities: HashSet<String>,
    pub agent_types: HashSet<String>,
    pub wallet: Option<String>,
    pub specs: NodeSpecs,
    pub secret: String,
    pub version: String,
}

/// Verifies `request.secret` against `configured_secret` using a
/// constant-time comparison, so response latency does not leak how many
/// leading bytes matched (spec.md §4.3: "verify secret == configured
/// nodeSecret (constant-time compare)").
pub fn verify_secret(request: &AuthRequest, configured_secret: &str) -> Result<(), SupervisorError> {
    if constant_time_eq(request.secret.as_bytes(), configured_secret.as_bytes()) {
        Ok(())
    } else {
        Err(SupervisorError::AuthDenied)
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (byte_left, byte_right) in left.iter().zip(right.iter()) {
        diff |= byte_left ^ byte_right;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request(secret: &str) -> AuthRequest {
        AuthRequest {
            node_id: "node-1".to_string(),
            capabilities: HashSet::new(),
            agent_types: HashSet::new(),
            wallet: None,
            specs: NodeSpecs {
                os: "linux".to_string(),
                arch: "x86_64".to_string(),
                cpu_cores: 4,
                total_memory_gb: 8.0,
                runtime_version: "1.0.0".to_string(),
            },
            secret: secret.to_string(),
            version: "1".to_string(),
        }
    }

    #[test]
    fn verify_secret_accepts_matching_secret() {
        let request = sample_request("correct-horse-battery-staple");
        assert!(verify_secret(&request, "correct-horse-battery-staple").is_ok());
    }

    #[test]
    fn verify_secret_rejects_mismatched_secret() {
        let request = sample_request("wrong-secret");
        assert!(matches!(
            verify_secret(&request, "correct-horse-battery-staple"),
            Err(SupervisorError::AuthDenied)
        ));
    }

    #[test]
    fn verify_secret_rejects_different_length_secrets() {
        let request = sample_request("short");
        assert!(matches!(
            verify_secret(&request, "a-much-longer-configured-secret"),
            Err(SupervisorError::AuthDenied)
        ));
    }
}
