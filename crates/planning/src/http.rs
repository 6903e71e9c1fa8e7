// [crates/planning/src/http.rs]
/*!
 * Default `IntentPlanner`/`ToolPlanner` implementation backed by an HTTP LLM
 * provider endpoint. The provider itself is explicitly out of scope
 * (spec.md §1 lists it among the externalized capabilities); this client
 * only defines the request/response shape the core depends on and applies
 * the narrow structured-output validator to whatever the provider returns.
 * Grounded in the teacher's `OnChainSettlementBackend`-style reqwest client
 * shape (`libs/infra/blockchain-client`), reused here for a different
 * upstream.
 */

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::warn;
use vanguard_models::AgentDefinition;

use crate::errors::PlanningError;
use crate::traits::{IntentPlanner, ToolPlanner};
use crate::types::{IntentSelection, ToolCall, ToolResult};
use crate::validator::validate_intent_result;

pub struct HttpPlanner {
    http: Client,
    base_url: String,
}

impl HttpPlanner {
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent("Vanguard-Planning-Uplink/1.0")
                .build()
                .expect("CRITICAL: failed to initialize planning HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value, PlanningError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.http.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(PlanningError::ProviderStatus(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl IntentPlanner for HttpPlanner {
    async fn select_agents(
        &self,
        user_message: &str,
        catalogue: &[AgentDefinition],
    ) -> Result<IntentSelection, PlanningError> {
        let catalogue_summaries: Vec<_> = catalogue
            .iter()
            .map(|agent| json!({ "id": agent.id, "description": agent.description }))
            .collect();

        let raw = self
            .post_json(
                "v1/intent",
                json!({ "userMessage": user_message, "catalogue": catalogue_summaries }),
            )
            .await?;

        let agent_ids = validate_intent_result(&raw)?;
        let reasoning = raw
            .get("reasoning")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(IntentSelection { agent_ids, reasoning })
    }
}

#[async_trait]
impl ToolPlanner for HttpPlanner {
    async fn plan_calls(&self, agent: &AgentDefinition, user_message: &str) -> Result<Vec<ToolCall>, PlanningError> {
        let raw = self
            .post_json(
                "v1/tools/plan",
                json!({ "agentId": agent.id, "userMessage": user_message }),
            )
            .await?;

        let calls = raw
            .get("calls")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| PlanningError::MalformedResponse("missing 'calls' array".to_string()))?;

        calls
            .iter()
            .map(|entry| serde_json::from_value(entry.clone()).map_err(|err| PlanningError::MalformedResponse(err.to_string())))
            .collect()
    }

    async fn summarize(
        &self,
        agent: &AgentDefinition,
        user_message: &str,
        tool_results: &[ToolResult],
    ) -> Result<String, PlanningError> {
        let raw = self
            .post_json(
                "v1/tools/summarize",
                json!({ "agentId": agent.id, "userMessage": user_message, "toolResults": tool_results }),
            )
            .await?;

        raw.get("summary")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PlanningError::MalformedResponse("missing 'summary' string".to_string()))
    }

    async fn aggregate(&self, user_message: &str, per_agent_summaries: &[(String, String)]) -> Result<String, PlanningError> {
        let summaries: Vec<_> = per_agent_summaries
            .iter()
            .map(|(name, summary)| json!({ "agent": name, "summary": summary }))
            .collect();

        let raw = self
            .post_json("v1/aggregate", json!({ "userMessage": user_message, "summaries": summaries }))
            .await
            .map_err(|err| {
                warn!(error = %err, "aggregation provider call failed, caller will fall back to concatenation");
                err
            })?;

        raw.get("summary")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PlanningError::MalformedResponse("missing 'summary' string".to_string()))
    }
}
