// [crates/planning/src/types.rs]
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One planned tool invocation, as returned by `ToolPlanner::plan_calls`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    pub params: Value,
}

/// Result of executing one planned [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool: String,
    pub output: Value,
}

/// Outcome of `IntentPlanner::select_agents`, already validated at the
/// boundary (spec.md §9).
#[derive(Debug, Clone)]
pub struct IntentSelection {
    pub agent_ids: Vec<String>,
    pub reasoning: String,
}
