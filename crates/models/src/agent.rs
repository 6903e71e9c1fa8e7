// [crates/models/src/agent.rs]
use serde::{Deserialize, Serialize};

/// Parameter/description descriptor for one tool an agent may call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameter_names: Vec<String>,
}

/// Immutable catalogue record for one agent specialty (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub tool_descriptors: Vec<ToolDescriptor>,
    pub keywords: Vec<String>,
}

impl AgentDefinition {
    /// True when the lowercase user message shares at least one keyword with
    /// this agent; used by the orchestrator's fallback selector.
    pub fn matches_keywords(&self, lowercase_message: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| lowercase_message.contains(keyword.as_str()))
    }
}
