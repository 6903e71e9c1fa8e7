// [crates/planning/src/errors.rs]
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("planner request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("planner returned a non-success status: {0}")]
    ProviderStatus(u16),

    #[error("planner response failed structural validation: {0}")]
    MalformedResponse(String),
}
