use serde::{Serialize, Serializer};

use crate::llm::ChatMessage;

use super::{AgentKind, ContextStore};

/// Lifecycle of an orchestrated task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Started,
    InProgress,
    Complete,
}

/// Which node runs next. `End` is the only terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentAgent {
    Agent(AgentKind),
    End,
}

impl CurrentAgent {
    pub const TERMINAL: [CurrentAgent; 1] = [CurrentAgent::End];

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CurrentAgent::Agent(kind) => kind.as_str(),
            CurrentAgent::End => "END",
        }
    }
}

impl Serialize for CurrentAgent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// State threaded through every node of one workflow run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentState {
    pub messages: Vec<ChatMessage>,
    pub current_agent: CurrentAgent,
    /// Specialists delegated to, in order.
    pub agent_history: Vec<AgentKind>,
    pub context: ContextStore,
    pub final_answer: Option<String>,
    pub task_status: TaskStatus,
    original_query: String,
}

impl AgentState {
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            messages: vec![ChatMessage::user(query.clone())],
            current_agent: CurrentAgent::Agent(AgentKind::Orchestrator),
            agent_history: Vec::new(),
            context: ContextStore::new(),
            final_answer: None,
            task_status: TaskStatus::Started,
            original_query: query,
        }
    }

    pub fn original_query(&self) -> &str {
        &self.original_query
    }

    /// Delegate the next step to `agent`.
    pub fn route_to(&mut self, agent: AgentKind) {
        self.current_agent = CurrentAgent::Agent(agent);
        self.agent_history.push(agent);
        self.task_status = TaskStatus::InProgress;
    }

    /// Return control to the orchestrator.
    pub fn hand_back(&mut self) {
        self.current_agent = CurrentAgent::Agent(AgentKind::Orchestrator);
    }

    pub fn finalize(&mut self, answer: String) {
        self.final_answer = Some(answer);
        self.task_status = TaskStatus::Complete;
        self.current_agent = CurrentAgent::End;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_at_orchestrator() {
        let state = AgentState::new("Who is Leo Messi?");
        assert_eq!(state.current_agent, CurrentAgent::Agent(AgentKind::Orchestrator));
        assert_eq!(state.task_status, TaskStatus::Started);
        assert_eq!(state.messages.len(), 1);
        assert!(state.agent_history.is_empty());
        assert_eq!(state.original_query(), "Who is Leo Messi?");
    }

    #[test]
    fn routing_and_finalizing_update_status() {
        let mut state = AgentState::new("q");
        state.route_to(AgentKind::Writer);
        assert_eq!(state.task_status, TaskStatus::InProgress);
        state.hand_back();
        state.finalize("answer".to_string());
        assert!(state.current_agent.is_terminal());
        assert_eq!(state.task_status, TaskStatus::Complete);
        assert_eq!(state.agent_history, vec![AgentKind::Writer]);
    }

    #[test]
    fn serializes_agent_names_as_strings() {
        let mut state = AgentState::new("q");
        state.route_to(AgentKind::WebSearch);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["agent_history"], serde_json::json!(["web_search"]));
        assert_eq!(json["current_agent"], "web_search");
        assert_eq!(json["task_status"], "in_progress");
        assert_eq!(json["original_query"], "q");
    }
}
