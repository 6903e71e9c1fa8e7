/*!
 * [crates/agents/src/lib.rs]
 * Static catalogue of the 15 stock agents, their tool descriptors, the
 * keyword fallback selector, and the local tool dispatcher (spec.md §3,
 * §4.8). Grounded in the teacher's domain-model crates
 * (`libs/domain/models-rs`), generalized from mining-node metadata into
 * agent-catalogue metadata.
 */

pub mod catalogue;
pub mod errors;
pub mod tools;

pub use catalogue::{select_by_keywords, stock_catalogue, FALLBACK_AGENT_ID};
pub use errors::ToolError;
pub use tools::{EchoInputTool, LocalTool, LocalToolDispatcher, LookupKeywordFactsTool};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_catalogue_has_fifteen_agents_with_unique_ids() {
        let catalogue = stock_catalogue();
        assert_eq!(catalogue.len(), 15);

        let mut ids: Vec<&str> = catalogue.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 15);
    }

    #[test]
    fn select_by_keywords_matches_travel_planner_for_trip_request() {
        let catalogue = stock_catalogue();
        let selected = select_by_keywords(&catalogue, "Help me plan a trip to Tokyo");
        assert!(selected.iter().any(|a| a.id == "travel-planner"));
    }

    #[test]
    fn select_by_keywords_falls_back_to_general_assistant_when_nothing_matches() {
        let catalogue = stock_catalogue();
        let selected = select_by_keywords(&catalogue, "zzz qqq xyzzy plugh");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, FALLBACK_AGENT_ID);
    }

    #[test]
    fn select_by_keywords_caps_matches_at_three() {
        let catalogue = stock_catalogue();
        let selected = select_by_keywords(
            &catalogue,
            "I need a trip budget review of my code and a workout plan and legal contract advice",
        );
        assert!(selected.len() <= 3);
    }
}
