// [crates/agents/src/tools.rs]
/*!
 * Local tool dispatcher contract. Remote/provider-backed tools (`tool:webSearch`,
 * `tool:codeExecution`, ...) are invoked by the orchestrator's planning layer
 * and never reach this module; `LocalTool` exists only for the small set of
 * catalogue-local tools that execute in-process with no network access.
 */

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ToolError;

#[async_trait]
pub trait LocalTool: Send + Sync {
    /// Name this tool is registered under, matching a catalogue `ToolDescriptor.name`.
    fn name(&self) -> &str;

    /// Runs the tool against a JSON object of arguments, returning a JSON result.
    async fn call(&self, arguments: &Value) -> Result<Value, ToolError>;
}

/// Echoes the `text` argument back verbatim. Used by agents that only need
/// to confirm receipt of user input without any real computation.
pub struct EchoInputTool;

#[async_trait]
impl LocalTool for EchoInputTool {
    fn name(&self) -> &str {
        "echo_input"
    }

    async fn call(&self, arguments: &Value) -> Result<Value, ToolError> {
        let text = arguments
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingArgument("text".to_string()))?;

        Ok(serde_json::json!({ "echo": text }))
    }
}

/// Looks up a short canned fact for a keyword, from a small fixed reference
/// table. Stands in for the kind of offline lookup a catalogue agent might
/// perform without reaching an external provider.
pub struct LookupKeywordFactsTool {
    facts: HashMap<&'static str, &'static str>,
}

impl LookupKeywordFactsTool {
    pub fn new() -> Self {
        let mut facts = HashMap::new();
        facts.insert("budget", "A simple budget tracks income against fixed, variable, and discretionary spending.");
        facts.insert("legal", "General legal information is not a substitute for advice from a licensed attorney.");
        facts.insert("medical", "General medical information is not a substitute for advice from a licensed clinician.");
        facts.insert("fitness", "Progressive overload and adequate recovery are the two pillars of most training plans.");
        facts.insert("finance", "Diversification reduces the impact of any single investment's volatility on a portfolio.");
        facts.insert("language", "Spaced repetition is one of the most effective techniques for vocabulary retention.");
        Self { facts }
    }
}

impl Default for LookupKeywordFactsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalTool for LookupKeywordFactsTool {
    fn name(&self) -> &str {
        "lookup_keyword_facts"
    }

    async fn call(&self, arguments: &Value) -> Result<Value, ToolError> {
        let keyword = arguments
            .get("keyword")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingArgument("keyword".to_string()))?;

        let fact = self
            .facts
            .get(keyword.to_lowercase().as_str())
            .copied()
            .unwrap_or("No reference fact is on file for that keyword.");

        Ok(serde_json::json!({ "keyword": keyword, "fact": fact }))
    }
}

/// Registry of the local tools available to the orchestrator, keyed by name.
pub struct LocalToolDispatcher {
    tools: HashMap<String, Arc<dyn LocalTool>>,
}

impl LocalToolDispatcher {
    /// Registers the two illustrative local tools (`echo_input`, `lookup_keyword_facts`).
    pub fn with_stock_tools() -> Self {
        let mut dispatcher = Self { tools: HashMap::new() };
        dispatcher.register(Arc::new(EchoInputTool));
        dispatcher.register(Arc::new(LookupKeywordFactsTool::new()));
        dispatcher
    }

    pub fn register(&mut self, tool: Arc<dyn LocalTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub async fn call(&self, name: &str, arguments: &Value) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.call(arguments).await
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_input_returns_given_text() {
        let tool = EchoInputTool;
        let result = tool.call(&serde_json::json!({ "text": "hello" })).await.unwrap();
        assert_eq!(result["echo"], "hello");
    }

    #[tokio::test]
    async fn lookup_keyword_facts_falls_back_for_unknown_keyword() {
        let tool = LookupKeywordFactsTool::new();
        let result = tool.call(&serde_json::json!({ "keyword": "astrology" })).await.unwrap();
        assert_eq!(result["fact"], "No reference fact is on file for that keyword.");
    }

    #[tokio::test]
    async fn dispatcher_rejects_unknown_tool_name() {
        let dispatcher = LocalToolDispatcher::with_stock_tools();
        let outcome = dispatcher.call("tool:webSearch", &serde_json::json!({})).await;
        assert!(matches!(outcome, Err(ToolError::UnknownTool(name)) if name == "tool:webSearch"));
    }
}
