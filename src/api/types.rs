//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::{ChatRun, LogEntry};
use crate::agents::{AgentKind, ContextStore, TaskStatus, WorkflowRun};
use crate::llm::ChatMessage;

/// Request body for both pipelines.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// The user question
    pub query: String,
}

/// Response from the tool loop.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponseBody {
    /// Unique run identifier
    pub id: Uuid,

    pub answer: String,

    /// Number of chatbot turns
    pub iterations: usize,

    /// Number of times the tools node ran
    pub tool_visits: usize,

    pub messages: Vec<ChatMessage>,

    /// Detailed execution log
    pub log: Vec<LogEntry>,
}

impl ChatResponseBody {
    pub fn from_run(run: ChatRun) -> Self {
        Self {
            id: Uuid::new_v4(),
            answer: run.answer,
            iterations: run.iterations,
            tool_visits: run.tool_visits,
            messages: run.messages,
            log: run.log,
        }
    }
}

/// Response from the orchestrated workflow.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResponseBody {
    pub id: Uuid,

    /// Final answer, absent only if the run ended without finalizing
    pub final_answer: Option<String>,

    pub task_status: TaskStatus,

    /// Specialists the orchestrator routed to, in order
    pub agent_history: Vec<AgentKind>,

    /// Total node executions
    pub steps: usize,

    pub context: ContextStore,

    pub messages: Vec<ChatMessage>,
}

impl WorkflowResponseBody {
    pub fn from_run(run: WorkflowRun) -> Self {
        let state = run.state;
        Self {
            id: Uuid::new_v4(),
            final_answer: state.final_answer,
            task_status: state.task_status,
            agent_history: state.agent_history,
            steps: run.steps,
            context: state.context,
            messages: state.messages,
        }
    }
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code
    pub code: String,
    pub message: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Active search provider
    pub search_provider: String,
}
