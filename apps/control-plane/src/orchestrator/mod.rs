// [apps/control-plane/src/orchestrator/mod.rs]
/*!
 * Multi-agent orchestration (spec.md §4.8): intent selection, concurrent
 * per-agent tool planning/execution/summarization, and aggregation.
 * The fan-out across selected agents is grounded in the teacher's
 * `join_all`-based parallel shard download in
 * `worker-client/src/client.rs::synchronize_mission_sharded_filter`,
 * repurposed here from parallel file fetches to parallel agent execution.
 */

use futures::future::join_all;
use serde_json::Value;
use tracing::{instrument, warn};
use vanguard_agents::select_by_keywords;
use vanguard_models::AgentDefinition;
use vanguard_planning::{IntentPlanner, ToolCall, ToolPlanner, ToolResult};

use crate::state::dispatcher::{AgentJobOutcome, DEFAULT_AGENT_JOB_TIMEOUT_MS};
use crate::state::AppState;

const MAX_SELECTED_AGENTS: usize = 3;
const WORKER_TOOL_TIMEOUT_MS: u64 = 30_000;
const ERROR_SUMMARY_PREFIX: &str = "Error: ";

/// One agent's contribution to a chat query (spec.md §6's
/// `agentResults[{agent, tools[], summary}]`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct AgentResult {
    pub agent: String,
    pub tools: Vec<String>,
    pub summary: String,
}

/// The orchestrator's full output, before the HTTP handler decides whether
/// to deduct and distribute.
#[derive(Debug, Clone)]
pub struct MultiAgentResponse {
    pub agents_used: Vec<String>,
    pub agent_results: Vec<AgentResult>,
    pub message: String,
}

impl MultiAgentResponse {
    /// Success criterion of spec.md §4.8: at least one agent result whose
    /// summary does not begin with `"Error: "`. Governs whether the HTTP
    /// handler performs `deduct` + `distribute`.
    pub fn charged(&self) -> bool {
        self.agent_results
            .iter()
            .any(|result| !result.summary.starts_with(ERROR_SUMMARY_PREFIX))
    }
}

/// Runs all three phases of spec.md §4.8 against `user_message`.
#[instrument(skip(state, user_message))]
pub async fn execute(state: &AppState, user_message: &str) -> MultiAgentResponse {
    let catalogue = state.catalogue_snapshot().await;
    let selected = select_agents(state, user_message, &catalogue).await;

    let agent_results: Vec<AgentResult> = join_all(
        selected
            .iter()
            .map(|agent| run_agent(state, agent, user_message)),
    )
    .await;

    let agents_used = agent_results.iter().map(|result| result.agent.clone()).collect();
    let message = aggregate(state, user_message, &agent_results).await;

    MultiAgentResponse {
        agents_used,
        agent_results,
        message,
    }
}

/// Phase 1 (spec.md §4.8): planner-driven selection, falling back to
/// keyword matching on error or malformed output, capped at three agents.
async fn select_agents<'a>(
    state: &AppState,
    user_message: &str,
    catalogue: &'a [AgentDefinition],
) -> Vec<&'a AgentDefinition> {
    match state.planner.select_agents(user_message, catalogue).await {
        Ok(selection) => {
            let mut matched: Vec<&AgentDefinition> = selection
                .agent_ids
                .iter()
                .filter_map(|id| catalogue.iter().find(|agent| &agent.id == id))
                .collect();
            matched.truncate(MAX_SELECTED_AGENTS);
            if matched.is_empty() {
                warn!("planner returned no agents present in the catalogue, falling back to keywords");
                select_by_keywords(catalogue, user_message)
            } else {
                matched
            }
        }
        Err(fault) => {
            warn!(error = %fault, "intent planner unavailable, falling back to keyword selection");
            select_by_keywords(catalogue, user_message)
        }
    }
}

/// Phase 2 (spec.md §4.8): plan, execute, and summarize for one agent. Any
/// failure inside the agent produces a partial `Error: ...` result rather
/// than aborting the whole query.
///
/// If a connected worker specifically advertises this agent's id among its
/// `agentTypes`, the whole agent run is delegated to it via `AGENT_JOB`
/// instead of being planned and executed locally (spec.md §5(iv)'s
/// agent-job dispatch path).
async fn run_agent(state: &AppState, agent: &AgentDefinition, user_message: &str) -> AgentResult {
    if state.registry.specialized_node_for_agent(&agent.id).await.is_some() {
        return run_agent_on_worker(state, agent, user_message).await;
    }

    let tool_calls = match state.tool_planner.plan_calls(agent, user_message).await {
        Ok(calls) => calls,
        Err(fault) => {
            return error_result(agent, format!("planning failed: {fault}"));
        }
    };

    let mut tool_results = Vec::with_capacity(tool_calls.len());
    for call in &tool_calls {
        match execute_tool_call(state, call).await {
            Ok(output) => tool_results.push(ToolResult {
                tool: call.tool.clone(),
                output,
            }),
            Err(fault) => return error_result(agent, format!("tool `{}` failed: {fault}", call.tool)),
        }
    }

    let summary = match state.tool_planner.summarize(agent, user_message, &tool_results).await {
        Ok(summary) => summary,
        Err(fault) => return error_result(agent, format!("summarization failed: {fault}")),
    };

    AgentResult {
        agent: agent.id.clone(),
        tools: tool_calls.into_iter().map(|call| call.tool).collect(),
        summary,
    }
}

/// Delegates an entire agent turn to the specialized worker that claims
/// `agent.id`, via the `AGENT_JOB`/`AGENT_JOB_RESULT` pair.
async fn run_agent_on_worker(state: &AppState, agent: &AgentDefinition, user_message: &str) -> AgentResult {
    let outcome = state
        .dispatcher
        .dispatch_agent_job(&agent.id, user_message.to_string(), None, DEFAULT_AGENT_JOB_TIMEOUT_MS)
        .await;

    match outcome {
        Ok((_job_id, AgentJobOutcome::Success { response, tools_used, .. })) => {
            AgentResult { agent: agent.id.clone(), tools: tools_used, summary: response }
        }
        Ok((_job_id, AgentJobOutcome::Error(fault))) => error_result(agent, fault.message),
        Ok((_job_id, AgentJobOutcome::Timeout)) => error_result(agent, "agent job dispatch timed out".to_string()),
        Err(fault) => error_result(agent, fault.to_string()),
    }
}

fn error_result(agent: &AgentDefinition, reason: String) -> AgentResult {
    AgentResult {
        agent: agent.id.clone(),
        tools: Vec::new(),
        summary: format!("{ERROR_SUMMARY_PREFIX}{reason}"),
    }
}

/// Dispatches one planned tool call: local tools run in-process through the
/// catalogue's dispatcher, everything else is worker-bound by capability
/// `tool:<name>` and is routed to a node actually advertising it (spec.md
/// §4.8(b), §4.4).
async fn execute_tool_call(state: &AppState, call: &ToolCall) -> Result<Value, String> {
    if state.local_tools.is_local(&call.tool) {
        return state
            .local_tools
            .call(&call.tool, &call.params)
            .await
            .map_err(|fault| fault.to_string());
    }

    let capability = format!("tool:{}", call.tool);
    let (_job_id, _run_id, outcome) = state
        .dispatcher
        .dispatch_with_capability(
            &capability,
            serde_json::json!({ "tool": call.tool, "params": call.params }),
            WORKER_TOOL_TIMEOUT_MS,
            None,
            None,
        )
        .await
        .map_err(|fault| fault.to_string())?;

    match outcome {
        crate::state::dispatcher::DispatchOutcome::Success { output, .. } => {
            Ok(output.unwrap_or(Value::Null))
        }
        crate::state::dispatcher::DispatchOutcome::Error(job_error) => Err(job_error.message),
        crate::state::dispatcher::DispatchOutcome::Timeout => Err("worker tool dispatch timed out".to_string()),
    }
}

/// Phase 3 (spec.md §4.8): single-agent passthrough, multi-agent aggregation
/// via the tool planner, falling back to plain concatenation on failure.
async fn aggregate(state: &AppState, user_message: &str, results: &[AgentResult]) -> String {
    match results {
        [] => "No agent produced a result for this query.".to_string(),
        [single] => single.summary.clone(),
        many => {
            let per_agent: Vec<(String, String)> =
                many.iter().map(|result| (result.agent.clone(), result.summary.clone())).collect();

            match state.tool_planner.aggregate(user_message, &per_agent).await {
                Ok(aggregated) => aggregated,
                Err(fault) => {
                    warn!(error = %fault, "aggregation planner unavailable, concatenating summaries");
                    concatenate_summaries(many)
                }
            }
        }
    }
}

fn concatenate_summaries(results: &[AgentResult]) -> String {
    results
        .iter()
        .map(|result| format!("**{}:** {}", result.agent, result.summary))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_agent(id: &str) -> AgentDefinition {
        AgentDefinition {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            system_prompt: String::new(),
            tool_descriptors: Vec::new(),
            keywords: Vec::new(),
        }
    }

    #[test]
    fn charged_is_true_when_any_summary_is_not_an_error() {
        let response = MultiAgentResponse {
            agents_used: vec!["a".to_string()],
            agent_results: vec![
                AgentResult { agent: "a".to_string(), tools: vec![], summary: "Error: boom".to_string() },
                AgentResult { agent: "b".to_string(), tools: vec![], summary: "all good".to_string() },
            ],
            message: String::new(),
        };
        assert!(response.charged());
    }

    #[test]
    fn charged_is_false_when_every_summary_is_an_error() {
        let response = MultiAgentResponse {
            agents_used: vec!["a".to_string()],
            agent_results: vec![AgentResult {
                agent: "a".to_string(),
                tools: vec![],
                summary: "Error: boom".to_string(),
            }],
            message: String::new(),
        };
        assert!(!response.charged());
    }

    #[test]
    fn concatenate_summaries_joins_with_agent_name_headers() {
        let results = vec![
            AgentResult { agent: "travel-planner".to_string(), tools: vec![], summary: "book a flight".to_string() },
            AgentResult { agent: "budget-planner".to_string(), tools: vec![], summary: "track spend".to_string() },
        ];
        let joined = concatenate_summaries(&results);
        assert!(joined.contains("**travel-planner:** book a flight"));
        assert!(joined.contains("**budget-planner:** track spend"));
    }

    #[test]
    fn error_result_prefixes_the_reason() {
        let agent = sample_agent("research-analyst");
        let result = error_result(&agent, "planner offline".to_string());
        assert_eq!(result.summary, "Error: planner offline");
    }
}
