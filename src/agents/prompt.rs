//! Prompt templates for the orchestrated workflow.

use super::{AgentKind, ContextStore};

pub const ORCHESTRATOR_SYSTEM_PROMPT: &str = r#"You are the orchestrator agent responsible for:
1. Analyzing the query to determine which specialist agent to consult
2. Maintaining context and deciding when to revisit agents for more information
3. Determining when enough information has been gathered to provide a final answer

Available agents:
- web_search: Performs intelligent web searches to gather information
- writer: Synthesizes information into coherent text
- editor: Refines and improves content

Based on the current state and agent responses, decide the next step."#;

pub const FINALIZE_PROMPT: &str =
    "Please provide the final comprehensive answer based on all collected information.";

pub const SUFFICIENCY_PROMPT: &str =
    "Do we have enough information to provide a final answer? Respond with 'yes' or 'no'.";

pub const ROUTING_REMINDER: &str = "Your previous reply did not follow the required format. \
     Respond with exactly 'AGENT: <agent_name>' (one of web_search, writer, editor) or 'FINALIZE'.";

/// Routing question asked at every orchestrator step.
pub fn build_routing_prompt(context: &ContextStore, history: &[AgentKind]) -> String {
    let history = if history.is_empty() {
        "(none)".to_string()
    } else {
        history
            .iter()
            .map(AgentKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        r#"Current context:
{context}
Agent history: {history}

Determine the next best step:
1. Which agent should handle the next step?
2. What specific information do we need from them?
3. Should we collect more information or finalize the answer?

Respond with either:
- 'AGENT: [agent_name]' to route to another agent
- 'FINALIZE' to provide final answer"#,
        context = context.render(),
        history = history
    )
}

/// Grounded answer over gathered search context.
pub fn build_answer_prompt(search_context: &str, query: &str) -> String {
    format!(
        "Context:\n{search_context}\n\nQuestion:\n{query}\n\
         Please answer the question based on the provided context."
    )
}

pub fn build_writer_prompt(research: &str) -> String {
    format!("Using this research: {research}, generate comprehensive content.")
}

pub fn build_editor_prompt(content: &str) -> String {
    format!("Review and improve this content: {content}")
}
