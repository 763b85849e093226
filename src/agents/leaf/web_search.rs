//! Search specialist: gathers context for the original query and answers
//! from it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agents::prompt::build_answer_prompt;
use crate::agents::{AgentKind, AgentNode, AgentState, ContextKey};
use crate::error::RunError;
use crate::llm::{ChatMessage, LlmClient};
use crate::search::{SearchContextBuilder, SubQueryStyle};

pub struct WebSearchAgent {
    llm: Arc<dyn LlmClient>,
    builder: SearchContextBuilder,
}

impl WebSearchAgent {
    /// The builder's model also produces the grounded answer.
    pub fn new(llm: Arc<dyn LlmClient>, builder: SearchContextBuilder) -> Self {
        Self { llm, builder }
    }
}

#[async_trait]
impl AgentNode for WebSearchAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::WebSearch
    }

    async fn execute(&self, state: &mut AgentState) -> Result<(), RunError> {
        let query = state.original_query().to_string();
        let context = self.builder.build(&query, SubQueryStyle::Research).await?;
        tracing::debug!(
            sub_queries = context.sub_queries.len(),
            context_len = context.text.len(),
            "Search context gathered"
        );

        let answer = self
            .llm
            .complete(self.builder.model(), &build_answer_prompt(&context.text, &query))
            .await?;

        state
            .context
            .put(ContextKey::SearchContext, context.text, AgentKind::WebSearch);
        state
            .context
            .put(ContextKey::SearchResult, answer.clone(), AgentKind::WebSearch);
        state.messages.push(ChatMessage::assistant(answer));
        state.hand_back();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::CurrentAgent;
    use crate::llm::ModelSpec;
    use crate::test_support::{RecordingSearch, ScriptedLlm};

    #[tokio::test]
    async fn stores_context_and_grounded_answer() {
        let llm = Arc::new(ScriptedLlm::texts([
            "Who is Leo Messi?,Messi father name,Jorge Messi age",
            "Jorge Messi is his father.",
        ]));
        let search = Arc::new(RecordingSearch::with_content("Jorge Horacio Messi"));
        let builder =
            SearchContextBuilder::new(llm.clone(), search.clone(), ModelSpec::new("gpt-4-turbo"), 2);
        let agent = WebSearchAgent::new(llm.clone(), builder);
        let mut state = AgentState::new("Who is Leo Messi and what is his father's name?");
        state.route_to(AgentKind::WebSearch);

        agent.execute(&mut state).await.unwrap();

        assert_eq!(search.queries().len(), 3);
        assert_eq!(state.context.search_context(), "Jorge Horacio Messi\n".repeat(3));
        assert_eq!(state.context.search_result(), "Jorge Messi is his father.");
        assert_eq!(state.current_agent, CurrentAgent::Agent(AgentKind::Orchestrator));
        assert_eq!(state.messages.last().unwrap().content_str(), "Jorge Messi is his father.");

        let answer_call = &llm.calls()[1];
        assert_eq!(answer_call.model.model, "gpt-4-turbo");
        assert!(answer_call.messages[0]
            .content_str()
            .starts_with("Context:\nJorge Horacio Messi\n"));
    }

    #[tokio::test]
    async fn search_failure_leaves_state_untouched() {
        let llm = Arc::new(ScriptedLlm::texts(["a"]));
        let builder = SearchContextBuilder::new(
            llm.clone(),
            Arc::new(RecordingSearch::failing()),
            ModelSpec::new("m"),
            2,
        );
        let agent = WebSearchAgent::new(llm, builder);
        let mut state = AgentState::new("q");

        let err = agent.execute(&mut state).await.unwrap_err();

        assert!(matches!(err, RunError::Provider(_)));
        assert!(state.context.is_empty());
        assert_eq!(state.messages.len(), 1);
    }
}
