// [crates/agents/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{0}' is not registered in the local dispatcher")]
    UnknownTool(String),

    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },
}
