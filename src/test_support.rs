//! Scripted providers for unit tests. No network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::llm::{ChatMessage, ChatResponse, FunctionCall, LlmClient, ModelSpec, ToolCall, ToolSchema};
use crate::search::{SearchProvider, SearchResult};

/// One recorded `chat_completion` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: ModelSpec,
    pub messages: Vec<ChatMessage>,
    pub tool_names: Vec<String>,
}

type Responder = Box<dyn Fn(&RecordedCall, usize) -> Option<ChatResponse> + Send + Sync>;

/// LLM stub answering from a closure over the incoming call and its index.
pub struct ScriptedLlm {
    responder: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedLlm {
    pub fn with<F>(responder: F) -> Self
    where
        F: Fn(&RecordedCall, usize) -> Option<ChatResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replies with `responses` in order; errors once they run out.
    pub fn responses(responses: impl IntoIterator<Item = ChatResponse>) -> Self {
        let queue = Mutex::new(responses.into_iter().collect::<VecDeque<_>>());
        Self::with(move |_, _| queue.lock().unwrap().pop_front())
    }

    pub fn texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::responses(texts.into_iter().map(ChatResponse::text).collect::<Vec<_>>())
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.calls().into_iter().map(|c| c.messages).collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat_completion(
        &self,
        model: &ModelSpec,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
    ) -> Result<ChatResponse, ProviderError> {
        let call = RecordedCall {
            model: model.clone(),
            messages: messages.to_vec(),
            tool_names: tools
                .unwrap_or_default()
                .iter()
                .map(|t| t.function.name.clone())
                .collect(),
        };
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call.clone());
            calls.len() - 1
        };
        (self.responder)(&call, index)
            .ok_or_else(|| ProviderError::decode("scripted", "script exhausted"))
    }
}

/// Assistant turn requesting one tool call.
pub fn tool_call_response(id: &str, name: &str, arguments: &str) -> ChatResponse {
    ChatResponse {
        content: None,
        tool_calls: Some(vec![ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }]),
        usage: None,
    }
}

/// Search stub that records every query.
pub struct RecordingSearch {
    content: Option<String>,
    fail: bool,
    queries: Mutex<Vec<String>>,
}

impl RecordingSearch {
    pub fn with_content(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self {
            content: None,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            content: None,
            fail: true,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for RecordingSearch {
    fn name(&self) -> &str {
        "recording"
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(ProviderError::Api {
                provider: "recording",
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self
            .content
            .iter()
            .take(max_results)
            .map(|content| SearchResult {
                title: query.to_string(),
                url: format!("https://search.example/{}", query.len()),
                content: content.clone(),
            })
            .collect())
    }
}
