//! Orchestrator agent: decides which specialist runs next, or finalizes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RunError;
use crate::llm::{ChatMessage, LlmClient, ModelSpec};

use super::prompt::{
    build_routing_prompt, FINALIZE_PROMPT, ORCHESTRATOR_SYSTEM_PROMPT, ROUTING_REMINDER,
    SUFFICIENCY_PROMPT,
};
use super::{reply_text, AgentKind, AgentNode, AgentState};

const AGENT_MARKER: &str = "AGENT:";
const FINALIZE_MARKER: &str = "FINALIZE";

/// Parsed orchestrator answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    Finalize,
    Delegate(AgentKind),
}

/// Parse a routing answer.
///
/// `FINALIZE` anywhere wins. Otherwise the text after the first `AGENT:` names
/// a specialist: the first non-blank line is trimmed, lower-cased and stripped of
/// brackets and quotes; spaces and hyphens become underscores. If the whole
/// line is not a name, its first word is tried.
///
/// # Errors
///
/// `ProtocolViolation` when neither marker is present, `UnknownAgent` when the
/// name is not a specialist.
pub fn parse_routing(response: &str) -> Result<RoutingDecision, RunError> {
    if response.contains(FINALIZE_MARKER) {
        return Ok(RoutingDecision::Finalize);
    }

    let Some(idx) = response.find(AGENT_MARKER) else {
        return Err(RunError::ProtocolViolation {
            response: response.to_string(),
        });
    };

    let line = response[idx + AGENT_MARKER.len()..]
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let name = normalize_agent_name(line);

    let kind = match name.parse::<AgentKind>() {
        Ok(kind) => kind,
        Err(err) => {
            let first_word = line.split_whitespace().next().unwrap_or("");
            normalize_agent_name(first_word)
                .parse::<AgentKind>()
                .map_err(|_| err)?
        }
    };

    if !kind.is_specialist() {
        return Err(RunError::UnknownAgent(kind.as_str().to_string()));
    }
    Ok(RoutingDecision::Delegate(kind))
}

fn normalize_agent_name(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| matches!(c, '[' | ']' | '<' | '>' | '\'' | '"' | '`' | '*' | '.'))
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    model: ModelSpec,
    routing_retries: usize,
    sufficiency_check: bool,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, model: ModelSpec) -> Self {
        Self {
            llm,
            model,
            routing_retries: 1,
            sufficiency_check: false,
        }
    }

    /// How many times a malformed routing answer is re-asked before failing.
    pub fn with_routing_retries(mut self, retries: usize) -> Self {
        self.routing_retries = retries;
        self
    }

    /// Ask whether the run can finalize before every routing decision.
    pub fn with_sufficiency_check(mut self, enabled: bool) -> Self {
        self.sufficiency_check = enabled;
        self
    }

    /// System prompt followed by the run's conversation.
    fn conversation(&self, state: &AgentState) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(state.messages.len() + 2);
        messages.push(ChatMessage::system(ORCHESTRATOR_SYSTEM_PROMPT));
        messages.extend(state.messages.iter().cloned());
        messages
    }

    async fn ask(&self, messages: &[ChatMessage]) -> Result<String, RunError> {
        let response = self.llm.chat_completion(&self.model, messages, None).await?;
        reply_text(response)
    }

    /// `false` only when the model answers exactly "no"; any other answer
    /// means the gathered information suffices.
    pub async fn has_enough_information(&self, state: &AgentState) -> Result<bool, RunError> {
        let mut messages = self.conversation(state);
        messages.push(ChatMessage::user(SUFFICIENCY_PROMPT));
        let answer = self.ask(&messages).await?;
        Ok(answer.trim().to_lowercase() != "no")
    }

    /// Ask for the next step, re-asking up to `routing_retries` times on a
    /// malformed answer.
    pub async fn decide(&self, state: &AgentState) -> Result<RoutingDecision, RunError> {
        let mut messages = self.conversation(state);
        messages.push(ChatMessage::user(build_routing_prompt(
            &state.context,
            &state.agent_history,
        )));

        let mut attempt = 0;
        loop {
            let answer = self.ask(&messages).await?;
            match parse_routing(&answer) {
                Err(RunError::ProtocolViolation { .. }) if attempt < self.routing_retries => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        response = %answer,
                        "Orchestrator answer matched no routing marker, retrying"
                    );
                    messages.push(ChatMessage::assistant(answer));
                    messages.push(ChatMessage::user(ROUTING_REMINDER));
                }
                other => return other,
            }
        }
    }

    pub async fn final_answer(&self, state: &AgentState) -> Result<String, RunError> {
        let mut messages = self.conversation(state);
        messages.push(ChatMessage::user(FINALIZE_PROMPT));
        self.ask(&messages).await
    }
}

#[async_trait]
impl AgentNode for Orchestrator {
    fn kind(&self) -> AgentKind {
        AgentKind::Orchestrator
    }

    async fn execute(&self, state: &mut AgentState) -> Result<(), RunError> {
        let decision = if self.sufficiency_check && self.has_enough_information(state).await? {
            tracing::debug!("Orchestrator has enough information");
            RoutingDecision::Finalize
        } else {
            self.decide(state).await?
        };

        match decision {
            RoutingDecision::Finalize => {
                let answer = self.final_answer(state).await?;
                state.finalize(answer);
            }
            RoutingDecision::Delegate(agent) => {
                tracing::debug!(agent = %agent, "Orchestrator delegating");
                state.route_to(agent);
            }
        }
        Ok(())
    }
}
