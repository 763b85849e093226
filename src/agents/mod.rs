//! Orchestrated multi-agent workflow.
//!
//! An orchestrator routes between three specialists (web search, writer,
//! editor). Every specialist returns control to the orchestrator; only the
//! orchestrator can end a run.
//!
//! ```text
//!              ┌──────────────┐
//!   start ───▶ │ orchestrator │ ──FINALIZE──▶ END
//!              └──────────────┘
//!               ▲    AGENT: <name>
//!               │    ▼
//!        web_search / writer / editor
//! ```

mod context_store;
pub mod leaf;
mod orchestrator;
mod prompt;
mod state;
mod workflow;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RunError;
use crate::llm::ChatResponse;

pub use context_store::{ContextEntry, ContextKey, ContextStore};
pub use orchestrator::{parse_routing, Orchestrator, RoutingDecision};
pub use state::{AgentState, CurrentAgent, TaskStatus};
pub use workflow::{Workflow, WorkflowRun};

/// Closed set of agent identities. Names outside this set are rejected when
/// the orchestrator's answer is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Orchestrator,
    WebSearch,
    Writer,
    Editor,
}

impl AgentKind {
    /// Agents the orchestrator may delegate to.
    pub const SPECIALISTS: [AgentKind; 3] =
        [AgentKind::WebSearch, AgentKind::Writer, AgentKind::Editor];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Orchestrator => "orchestrator",
            AgentKind::WebSearch => "web_search",
            AgentKind::Writer => "writer",
            AgentKind::Editor => "editor",
        }
    }

    pub fn is_specialist(&self) -> bool {
        !matches!(self, AgentKind::Orchestrator)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "orchestrator" => Ok(AgentKind::Orchestrator),
            "web_search" => Ok(AgentKind::WebSearch),
            "writer" => Ok(AgentKind::Writer),
            "editor" => Ok(AgentKind::Editor),
            other => Err(RunError::UnknownAgent(other.to_string())),
        }
    }
}

/// A workflow node: reads and updates the shared run state.
#[async_trait]
pub trait AgentNode: Send + Sync {
    fn kind(&self) -> AgentKind;

    async fn execute(&self, state: &mut AgentState) -> Result<(), RunError>;
}

/// Text of an assistant reply; a reply without content is an error.
pub(crate) fn reply_text(response: ChatResponse) -> Result<String, RunError> {
    response.content.ok_or(RunError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in [
            AgentKind::Orchestrator,
            AgentKind::WebSearch,
            AgentKind::Writer,
            AgentKind::Editor,
        ] {
            assert_eq!(kind.as_str().parse::<AgentKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_name_is_a_routing_failure() {
        let err = "critic".parse::<AgentKind>().unwrap_err();
        assert!(matches!(err, RunError::UnknownAgent(ref name) if name == "critic"));
    }

    #[test]
    fn orchestrator_is_not_a_specialist() {
        assert!(!AgentKind::Orchestrator.is_specialist());
        assert!(AgentKind::SPECIALISTS.iter().all(AgentKind::is_specialist));
    }
}
