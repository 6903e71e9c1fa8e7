// [apps/worker-node/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("SOCKET_FAULT: {0}")]
    Socket(String),

    #[error("AUTH_DENIED: {0}")]
    AuthDenied(String),

    #[error("AUTH_TIMEOUT: control plane did not ack AUTH in time")]
    AuthTimeout,

    #[error("CODEC_FAULT: {0}")]
    Codec(#[from] vanguard_protocol::CodecError),
}

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("NO_SCRIPT: job carried no script and this node has no other execution path")]
    NoScript,

    #[error("SPAWN_FAULT: {0}")]
    Spawn(String),

    #[error("TIMEOUT: job exceeded its allotted {0}ms")]
    Timeout(u64),
}
