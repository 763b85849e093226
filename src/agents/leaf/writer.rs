use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::prompt::build_writer_prompt;
use crate::agents::{reply_text, AgentKind, AgentNode, AgentState, ContextKey};
use crate::error::RunError;
use crate::llm::{ChatMessage, LlmClient, ModelSpec};

/// Turns the search result into long-form content.
pub struct WriterAgent {
    llm: Arc<dyn LlmClient>,
    model: ModelSpec,
}

impl WriterAgent {
    pub fn new(llm: Arc<dyn LlmClient>, model: ModelSpec) -> Self {
        Self { llm, model }
    }
}

#[async_trait]
impl AgentNode for WriterAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Writer
    }

    async fn execute(&self, state: &mut AgentState) -> Result<(), RunError> {
        let mut messages = state.messages.clone();
        messages.push(ChatMessage::user(build_writer_prompt(
            state.context.search_result(),
        )));

        let response = self.llm.chat_completion(&self.model, &messages, None).await?;
        let content = reply_text(response)?;

        state
            .context
            .put(ContextKey::WrittenContent, content.clone(), AgentKind::Writer);
        state.messages.push(ChatMessage::assistant(content));
        state.hand_back();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedLlm;

    #[tokio::test]
    async fn drafts_from_search_result() {
        let llm = Arc::new(ScriptedLlm::texts(["A long article."]));
        let writer = WriterAgent::new(llm.clone(), ModelSpec::new("w").with_temperature(0.7));
        let mut state = AgentState::new("q");
        state
            .context
            .put(ContextKey::SearchResult, "facts", AgentKind::WebSearch);

        writer.execute(&mut state).await.unwrap();

        assert_eq!(state.context.written_content(), "A long article.");
        let call = &llm.calls()[0];
        assert_eq!(call.model.temperature, Some(0.7));
        assert_eq!(
            call.messages.last().unwrap().content_str(),
            "Using this research: facts, generate comprehensive content."
        );
    }

    #[tokio::test]
    async fn missing_research_reads_as_empty() {
        let llm = Arc::new(ScriptedLlm::texts(["Draft."]));
        let writer = WriterAgent::new(llm.clone(), ModelSpec::new("w"));
        let mut state = AgentState::new("q");

        writer.execute(&mut state).await.unwrap();

        assert_eq!(
            llm.requests()[0][1].content_str(),
            "Using this research: , generate comprehensive content."
        );
    }
}
