//! Core tool loop implementation.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::error::RunError;
use crate::events::{emit, EventSink, RunEvent};
use crate::llm::{ChatMessage, LlmClient, ModelSpec, ToolCall};
use crate::tools::{ToolError, ToolRegistry};

/// Node of the tool loop. The terminal state is implicit: a chatbot turn
/// without tool calls ends the run.
#[derive(Debug)]
enum ChatNode {
    Chatbot,
    Tools(Vec<ToolCall>),
}

impl ChatNode {
    fn name(&self) -> &'static str {
        match self {
            ChatNode::Chatbot => "chatbot",
            ChatNode::Tools(_) => "tools",
        }
    }
}

/// Types of log entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryType {
    ToolCall,
    ToolResult,
    Response,
}

/// A single entry in the run log.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Timestamp (RFC 3339)
    pub timestamp: String,
    pub entry_type: LogEntryType,
    pub content: String,
}

impl LogEntry {
    fn new(entry_type: LogEntryType, content: String) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            entry_type,
            content,
        }
    }
}

/// Outcome of a completed tool loop.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRun {
    /// Final assistant answer
    pub answer: String,
    /// Full conversation, user query first
    pub messages: Vec<ChatMessage>,
    /// Number of times the tools node ran
    pub tool_visits: usize,
    /// Number of chatbot turns
    pub iterations: usize,
    pub log: Vec<LogEntry>,
}

/// Chat agent that may call tools until it answers without one.
pub struct ChatAgent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    model: ModelSpec,
    max_iterations: usize,
}

impl ChatAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        model: ModelSpec,
        max_iterations: usize,
    ) -> Self {
        Self {
            llm,
            tools,
            model,
            max_iterations,
        }
    }

    /// Run the loop for `query`, publishing progress to `events` if given.
    pub async fn run_task(
        &self,
        query: &str,
        events: Option<&EventSink>,
    ) -> Result<ChatRun, RunError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RunError::InvalidInput("query is required".to_string()));
        }

        let mut log = Vec::new();
        let mut messages = vec![ChatMessage::user(query)];
        emit(
            events,
            RunEvent::MessageAppended {
                message: messages[0].clone(),
            },
        );

        let tool_schemas = self.tools.get_tool_schemas();
        let mut tool_visits = 0;
        let mut iterations = 0;
        let mut step = 0;
        let mut node = ChatNode::Chatbot;

        loop {
            step += 1;
            emit(
                events,
                RunEvent::NodeEntered {
                    node: node.name().to_string(),
                    step,
                },
            );

            node = match node {
                ChatNode::Chatbot => {
                    if iterations >= self.max_iterations {
                        tracing::warn!(limit = self.max_iterations, "Tool loop budget exhausted");
                        return Err(RunError::BudgetExceeded {
                            limit: self.max_iterations,
                        });
                    }
                    iterations += 1;
                    tracing::debug!("Chat iteration {}", iterations);

                    let response = self
                        .llm
                        .chat_completion(&self.model, &messages, Some(&tool_schemas))
                        .await?;

                    if !response.requests_tools() && response.content.is_none() {
                        return Err(RunError::EmptyResponse);
                    }

                    let message = response.to_message();
                    messages.push(message.clone());
                    emit(events, RunEvent::MessageAppended { message });

                    match response.tool_calls {
                        Some(calls) if !calls.is_empty() => ChatNode::Tools(calls),
                        _ => {
                            let answer = response.content.unwrap_or_default();
                            log.push(LogEntry::new(
                                LogEntryType::Response,
                                truncate_for_log(&answer, 2000),
                            ));
                            tracing::info!(iterations, tool_visits, "Tool loop finished");
                            return Ok(ChatRun {
                                answer,
                                messages,
                                tool_visits,
                                iterations,
                                log,
                            });
                        }
                    }
                }
                ChatNode::Tools(calls) => {
                    tool_visits += 1;
                    for call in &calls {
                        let result = self.execute_tool_call(call, events, &mut log).await?;
                        let message = ChatMessage::tool_result(call.id.clone(), result);
                        messages.push(message.clone());
                        emit(events, RunEvent::MessageAppended { message });
                    }
                    ChatNode::Chatbot
                }
            };
        }
    }

    /// Execute a single tool call. Argument problems become an `Error:` result
    /// for the model; provider failures end the run.
    async fn execute_tool_call(
        &self,
        call: &ToolCall,
        events: Option<&EventSink>,
        log: &mut Vec<LogEntry>,
    ) -> Result<String, RunError> {
        let args: serde_json::Value =
            serde_json::from_str(&call.function.arguments).unwrap_or(serde_json::Value::Null);

        log.push(LogEntry::new(
            LogEntryType::ToolCall,
            format!(
                "Calling tool: {} with args: {}",
                call.function.name, call.function.arguments
            ),
        ));
        emit(
            events,
            RunEvent::ToolCall {
                id: call.id.clone(),
                name: call.function.name.clone(),
                args: args.clone(),
            },
        );

        let result = match self.tools.execute(&call.function.name, args).await {
            Ok(output) => output,
            Err(ToolError::InvalidArguments(msg)) => {
                tracing::warn!(tool = %call.function.name, "Tool rejected arguments: {}", msg);
                format!("Error: {}", msg)
            }
            Err(ToolError::Provider(e)) => return Err(e.into()),
        };

        log.push(LogEntry::new(
            LogEntryType::ToolResult,
            truncate_for_log(&result, 1000),
        ));
        emit(
            events,
            RunEvent::ToolResult {
                id: call.id.clone(),
                name: call.function.name.clone(),
                result: result.clone(),
            },
        );

        Ok(result)
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}... [truncated]", &s[..idx]),
        None => s.to_string(),
    }
}
