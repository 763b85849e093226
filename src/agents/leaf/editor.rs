use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::prompt::build_editor_prompt;
use crate::agents::{reply_text, AgentKind, AgentNode, AgentState, ContextKey};
use crate::error::RunError;
use crate::llm::{ChatMessage, LlmClient, ModelSpec};

/// Reviews the writer's draft.
pub struct EditorAgent {
    llm: Arc<dyn LlmClient>,
    model: ModelSpec,
}

impl EditorAgent {
    pub fn new(llm: Arc<dyn LlmClient>, model: ModelSpec) -> Self {
        Self { llm, model }
    }
}

#[async_trait]
impl AgentNode for EditorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Editor
    }

    async fn execute(&self, state: &mut AgentState) -> Result<(), RunError> {
        let mut messages = state.messages.clone();
        messages.push(ChatMessage::user(build_editor_prompt(
            state.context.written_content(),
        )));

        let response = self.llm.chat_completion(&self.model, &messages, None).await?;
        let content = reply_text(response)?;

        state
            .context
            .put(ContextKey::EditedContent, content.clone(), AgentKind::Editor);
        state.messages.push(ChatMessage::assistant(content));
        state.hand_back();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::CurrentAgent;
    use crate::llm::ChatResponse;
    use crate::test_support::ScriptedLlm;

    #[tokio::test]
    async fn revises_written_content() {
        let llm = Arc::new(ScriptedLlm::texts(["Tightened article."]));
        let editor = EditorAgent::new(llm.clone(), ModelSpec::new("e").with_temperature(0.0));
        let mut state = AgentState::new("q");
        state
            .context
            .put(ContextKey::WrittenContent, "Loose article.", AgentKind::Writer);
        state.route_to(AgentKind::Editor);

        editor.execute(&mut state).await.unwrap();

        let entry = state.context.get(ContextKey::EditedContent).unwrap();
        assert_eq!(entry.value, "Tightened article.");
        assert_eq!(entry.written_by, AgentKind::Editor);
        assert_eq!(entry.version, 2);
        assert_eq!(state.current_agent, CurrentAgent::Agent(AgentKind::Orchestrator));
        assert_eq!(
            llm.requests()[0][1].content_str(),
            "Review and improve this content: Loose article."
        );
    }

    #[tokio::test]
    async fn empty_reply_is_an_error() {
        let llm = Arc::new(ScriptedLlm::responses([ChatResponse::default()]));
        let editor = EditorAgent::new(llm, ModelSpec::new("e"));
        let mut state = AgentState::new("q");

        let err = editor.execute(&mut state).await.unwrap_err();

        assert!(matches!(err, RunError::EmptyResponse));
        assert!(state.context.get(ContextKey::EditedContent).is_none());
    }
}
