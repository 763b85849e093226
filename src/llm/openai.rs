//! OpenAI-compatible chat-completion client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

use super::{ChatMessage, ChatResponse, LlmClient, ModelSpec, ToolCall, ToolSchema, Usage};

const PROVIDER: &str = "openai";

/// Client for any endpoint speaking `POST /chat/completions`.
pub struct OpenAiClient {
    api_key: String,
    completions_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;
        Ok(Self {
            api_key,
            completions_url: completions_url(base_url),
            client,
        })
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSchema]>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn parse_completion(body: &str) -> Result<ChatResponse, ProviderError> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::decode(PROVIDER, "response contained no choices"))?;
    Ok(ChatResponse {
        content: choice.message.content,
        tool_calls: choice.message.tool_calls,
        usage: parsed.usage,
    })
}

fn api_error(status: u16, body: &str) -> ProviderError {
    let message = match serde_json::from_str::<ApiError>(body) {
        Ok(err) => err.error.message,
        Err(_) => body.to_string(),
    };
    ProviderError::Api {
        provider: PROVIDER,
        status,
        message,
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        model: &ModelSpec,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
    ) -> Result<ChatResponse, ProviderError> {
        let request = CompletionRequest {
            model: &model.model,
            messages,
            temperature: model.temperature,
            tools: tools.filter(|t| !t.is_empty()),
        };

        tracing::debug!(
            model = %model.model,
            messages = messages.len(),
            tools = request.tools.map_or(0, |t| t.len()),
            "Sending chat completion"
        );

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        let parsed = parse_completion(&body)?;
        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion finished"
            );
        }
        Ok(parsed)
    }
}
