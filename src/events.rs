use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::llm::ChatMessage;

/// Where a run publishes its progress. Dropped receivers are ignored.
pub type EventSink = mpsc::UnboundedSender<RunEvent>;

/// Progress events emitted by both pipelines.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    /// A state-machine node is about to run.
    NodeEntered { node: String, step: usize },
    /// A message was appended to the conversation.
    MessageAppended { message: ChatMessage },
    /// The model requested a tool.
    ToolCall { id: String, name: String, args: Value },
    /// A tool finished; `result` is what the model will see.
    ToolResult { id: String, name: String, result: String },
    /// The orchestrator delegated to a specialist.
    Routed { agent: String },
    /// The orchestrator produced the final answer.
    Finalized { answer: String },
}

pub(crate) fn emit(sink: Option<&EventSink>, event: RunEvent) {
    if let Some(tx) = sink {
        let _ = tx.send(event);
    }
}
