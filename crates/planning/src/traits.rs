// [crates/planning/src/traits.rs]
use async_trait::async_trait;
use vanguard_models::AgentDefinition;

use crate::errors::PlanningError;
use crate::types::{IntentSelection, ToolCall, ToolResult};

/// Selects which catalogue agents should handle a user message (spec.md §4.8
/// phase 1). The core consumes this as a small capability and falls back to
/// keyword matching on error or malformed output.
#[async_trait]
pub trait IntentPlanner: Send + Sync {
    async fn select_agents(
        &self,
        user_message: &str,
        catalogue: &[AgentDefinition],
    ) -> Result<IntentSelection, PlanningError>;
}

/// Plans, and later summarizes/aggregates, per-agent tool usage (spec.md
/// §4.8 phases 2-3).
#[async_trait]
pub trait ToolPlanner: Send + Sync {
    async fn plan_calls(&self, agent: &AgentDefinition, user_message: &str) -> Result<Vec<ToolCall>, PlanningError>;

    async fn summarize(
        &self,
        agent: &AgentDefinition,
        user_message: &str,
        tool_results: &[ToolResult],
    ) -> Result<String, PlanningError>;

    async fn aggregate(&self, user_message: &str, per_agent_summaries: &[(String, String)]) -> Result<String, PlanningError>;
}
