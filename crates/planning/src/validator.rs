// [crates/planning/src/validator.rs]
/*!
 * Narrow boundary validator for planner output (spec.md §9: "Treat as
 * opaque structured values with a narrow validator at the boundary; refuse
 * to accept an intent result that is not a well-typed `{agents:[string],
 * reasoning:string}`"). The planner's response is an LLM-provider-supplied
 * value and is never trusted further than this shape check.
 */

use serde_json::Value;

use crate::errors::PlanningError;

/// Validates a raw JSON value against `{agents: [string], reasoning: string}`,
/// returning the extracted agent ids on success.
pub fn validate_intent_result(raw: &Value) -> Result<Vec<String>, PlanningError> {
    let agents = raw
        .get("agents")
        .and_then(Value::as_array)
        .ok_or_else(|| PlanningError::MalformedResponse("missing 'agents' array".to_string()))?;

    let agent_ids = agents
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| PlanningError::MalformedResponse("'agents' must contain only strings".to_string()))
        })
        .collect::<Result<Vec<String>, PlanningError>>()?;

    if raw.get("reasoning").and_then(Value::as_str).is_none() {
        return Err(PlanningError::MalformedResponse("missing 'reasoning' string".to_string()));
    }

    Ok(agent_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_well_typed_intent_result() {
        let raw = json!({ "agents": ["travel-planner", "budget-planner"], "reasoning": "trip + cost" });
        let agents = validate_intent_result(&raw).unwrap();
        assert_eq!(agents, vec!["travel-planner", "budget-planner"]);
    }

    #[test]
    fn rejects_missing_agents_field() {
        let raw = json!({ "reasoning": "no agents field" });
        assert!(validate_intent_result(&raw).is_err());
    }

    #[test]
    fn rejects_non_string_agent_entries() {
        let raw = json!({ "agents": [1, 2], "reasoning": "wrong type" });
        assert!(validate_intent_result(&raw).is_err());
    }

    #[test]
    fn rejects_missing_reasoning_field() {
        let raw = json!({ "agents": ["general-assistant"] });
        assert!(validate_intent_result(&raw).is_err());
    }
}
