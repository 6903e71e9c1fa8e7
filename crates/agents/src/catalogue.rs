// [crates/agents/src/catalogue.rs]
//! Static catalogue of the 15 stock agents (spec.md §1, §3). Per-domain
//! agent definitions and their tool implementations are explicitly out of
//! scope of the core (spec.md §1); this catalogue supplies the concrete
//! data the orchestrator's fallback keyword selector needs to operate on.

use vanguard_models::{AgentDefinition, ToolDescriptor};

fn tool(name: &str, description: &str, parameter_names: &[&str]) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        parameter_names: parameter_names.iter().map(|p| p.to_string()).collect(),
    }
}

fn agent(
    id: &str,
    name: &str,
    description: &str,
    system_prompt: &str,
    tools: Vec<ToolDescriptor>,
    keywords: &[&str],
) -> AgentDefinition {
    AgentDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        system_prompt: system_prompt.to_string(),
        tool_descriptors: tools,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

/// Builds the immutable 15-agent catalogue. Called once at startup; callers
/// hold the result behind an `Arc` / `RwLock` if they need runtime CRUD on
/// top of it (spec.md §4.9's `/api/agents` endpoints).
pub fn stock_catalogue() -> Vec<AgentDefinition> {
    vec![
        agent(
            "general-assistant",
            "General Assistant",
            "Handles broad requests that do not fit a specialized agent.",
            "You are a helpful general-purpose assistant.",
            vec![tool("echo_input", "Echoes the user's input back for confirmation.", &["text"])],
            &["help", "general", "question", "assistant"],
        ),
        agent(
            "travel-planner",
            "Travel Planner",
            "Plans itineraries, flights, and lodging.",
            "You are a travel planning specialist focused on practical itineraries.",
            vec![tool("tool:webSearch", "Searches the web for travel information.", &["query"])],
            &["trip", "travel", "flight", "itinerary", "vacation", "tokyo", "hotel"],
        ),
        agent(
            "budget-planner",
            "Budget Planner",
            "Builds cost estimates and budgets for plans.",
            "You are a budgeting specialist who estimates and allocates costs.",
            vec![tool("lookup_keyword_facts", "Looks up cost reference facts by keyword.", &["keyword"])],
            &["budget", "cost", "cheap", "price", "afford", "spend"],
        ),
        agent(
            "code-reviewer",
            "Code Reviewer",
            "Reviews source code for bugs and style issues.",
            "You are a meticulous code reviewer focused on correctness.",
            vec![tool("tool:codeExecution", "Executes a snippet in a sandbox.", &["language", "source"])],
            &["code", "bug", "review", "function", "refactor"],
        ),
        agent(
            "research-analyst",
            "Research Analyst",
            "Synthesizes findings from multiple sources.",
            "You are a research analyst who synthesizes sourced findings.",
            vec![tool("tool:webSearch", "Searches the web for reference material.", &["query"])],
            &["research", "analyze", "study", "compare", "report"],
        ),
        agent(
            "data-scientist",
            "Data Scientist",
            "Performs data analysis and statistical reasoning.",
            "You are a data scientist who reasons about datasets and statistics.",
            vec![tool("tool:codeExecution", "Runs analysis scripts in a sandbox.", &["language", "source"])],
            &["data", "dataset", "statistics", "model", "regression"],
        ),
        agent(
            "legal-advisor",
            "Legal Advisor",
            "Surfaces general legal information (not legal advice).",
            "You provide general legal information and flag when a lawyer is needed.",
            vec![tool("lookup_keyword_facts", "Looks up general legal reference facts.", &["keyword"])],
            &["legal", "contract", "law", "lawsuit", "compliance"],
        ),
        agent(
            "medical-information",
            "Medical Information",
            "Surfaces general medical information (not medical advice).",
            "You provide general medical information and flag when a doctor is needed.",
            vec![tool("lookup_keyword_facts", "Looks up general medical reference facts.", &["keyword"])],
            &["symptom", "medical", "health", "diagnosis", "medicine"],
        ),
        agent(
            "creative-writer",
            "Creative Writer",
            "Drafts stories, copy, and creative text.",
            "You are a creative writer who drafts engaging prose.",
            vec![tool("echo_input", "Echoes a writing prompt back for confirmation.", &["text"])],
            &["story", "poem", "write", "creative", "draft"],
        ),
        agent(
            "fitness-coach",
            "Fitness Coach",
            "Builds workout and nutrition guidance.",
            "You are a fitness coach who builds practical training plans.",
            vec![tool("lookup_keyword_facts", "Looks up fitness reference facts.", &["keyword"])],
            &["workout", "fitness", "exercise", "gym", "nutrition"],
        ),
        agent(
            "language-tutor",
            "Language Tutor",
            "Helps with translation and language learning.",
            "You are a language tutor who explains grammar and vocabulary.",
            vec![tool("lookup_keyword_facts", "Looks up language reference facts.", &["keyword"])],
            &["translate", "language", "grammar", "vocabulary", "learn"],
        ),
        agent(
            "financial-advisor",
            "Financial Advisor",
            "Surfaces general financial planning information.",
            "You provide general financial planning information, not investment advice.",
            vec![tool("lookup_keyword_facts", "Looks up financial reference facts.", &["keyword"])],
            &["invest", "finance", "savings", "retirement", "portfolio"],
        ),
        agent(
            "marketing-strategist",
            "Marketing Strategist",
            "Drafts marketing plans and positioning.",
            "You are a marketing strategist who drafts go-to-market plans.",
            vec![tool("tool:webSearch", "Searches the web for market context.", &["query"])],
            &["marketing", "campaign", "brand", "audience", "positioning"],
        ),
        agent(
            "devops-engineer",
            "DevOps Engineer",
            "Advises on deployment, CI/CD, and infrastructure.",
            "You are a devops engineer who advises on deployment pipelines.",
            vec![tool("tool:codeExecution", "Runs infrastructure scripts in a sandbox.", &["language", "source"])],
            &["deploy", "pipeline", "docker", "kubernetes", "ci/cd", "infrastructure"],
        ),
        agent(
            "customer-support",
            "Customer Support",
            "Drafts customer-facing responses and triage.",
            "You are a customer support specialist who drafts empathetic responses.",
            vec![tool("echo_input", "Echoes a support ticket back for confirmation.", &["text"])],
            &["support", "ticket", "complaint", "refund", "customer"],
        ),
    ]
}

/// Default fallback agent used when the keyword selector matches nothing
/// (spec.md §4.8).
pub const FALLBACK_AGENT_ID: &str = "general-assistant";

/// Selects agents by intersecting their keywords with the lowercased user
/// message, capped at three (spec.md §4.8). Falls back to
/// [`FALLBACK_AGENT_ID`] alone when nothing matches.
pub fn select_by_keywords<'a>(catalogue: &'a [AgentDefinition], user_message: &str) -> Vec<&'a AgentDefinition> {
    let lowercase_message = user_message.to_lowercase();

    let matched: Vec<&AgentDefinition> = catalogue
        .iter()
        .filter(|agent| agent.matches_keywords(&lowercase_message))
        .take(3)
        .collect();

    if matched.is_empty() {
        catalogue
            .iter()
            .find(|agent| agent.id == FALLBACK_AGENT_ID)
            .into_iter()
            .collect()
    } else {
        matched
    }
}
