//! Workflow runner: dispatches the current agent until a terminal state or
//! the step budget is reached.

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::error::RunError;
use crate::events::{emit, EventSink, RunEvent};
use crate::llm::LlmClient;
use crate::search::{SearchContextBuilder, SearchProvider};

use super::leaf::{EditorAgent, WebSearchAgent, WriterAgent};
use super::{AgentKind, AgentNode, AgentState, CurrentAgent, Orchestrator};

/// Outcome of a completed workflow.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRun {
    pub state: AgentState,
    /// Every node executed, in order.
    pub visits: Vec<AgentKind>,
    pub steps: usize,
}

impl WorkflowRun {
    pub fn visit_count(&self, kind: AgentKind) -> usize {
        self.visits.iter().filter(|k| **k == kind).count()
    }
}

pub struct Workflow {
    orchestrator: Orchestrator,
    web_search: WebSearchAgent,
    writer: WriterAgent,
    editor: EditorAgent,
    max_steps: usize,
}

impl Workflow {
    pub fn new(
        orchestrator: Orchestrator,
        web_search: WebSearchAgent,
        writer: WriterAgent,
        editor: EditorAgent,
        max_steps: usize,
    ) -> Self {
        Self {
            orchestrator,
            web_search,
            writer,
            editor,
            max_steps,
        }
    }

    /// Workflow with every agent wired from configuration, sharing one client.
    pub fn from_config(
        config: &Config,
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        let orchestrator = Orchestrator::new(llm.clone(), config.models.orchestrator.clone())
            .with_routing_retries(config.routing_retries)
            .with_sufficiency_check(config.sufficiency_check);
        let builder = SearchContextBuilder::new(
            llm.clone(),
            search,
            config.models.search.clone(),
            config.search.max_results,
        );
        Self::new(
            orchestrator,
            WebSearchAgent::new(llm.clone(), builder),
            WriterAgent::new(llm.clone(), config.models.writer.clone()),
            EditorAgent::new(llm, config.models.editor.clone()),
            config.max_workflow_steps,
        )
    }

    /// Dispatch table from agent identity to node.
    fn node(&self, kind: AgentKind) -> &dyn AgentNode {
        match kind {
            AgentKind::Orchestrator => &self.orchestrator,
            AgentKind::WebSearch => &self.web_search,
            AgentKind::Writer => &self.writer,
            AgentKind::Editor => &self.editor,
        }
    }

    pub async fn run(
        &self,
        query: &str,
        events: Option<&EventSink>,
    ) -> Result<WorkflowRun, RunError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RunError::InvalidInput("query is required".to_string()));
        }
        tracing::info!(query = %query, max_steps = self.max_steps, "Starting workflow");
        self.run_from(AgentState::new(query), events).await
    }

    /// Drive `state` until it reaches a terminal agent.
    pub async fn run_from(
        &self,
        mut state: AgentState,
        events: Option<&EventSink>,
    ) -> Result<WorkflowRun, RunError> {
        let mut visits = Vec::new();
        let mut steps = 0;

        if let Some(first) = state.messages.first() {
            emit(
                events,
                RunEvent::MessageAppended {
                    message: first.clone(),
                },
            );
        }

        loop {
            let kind = match state.current_agent {
                CurrentAgent::End => break,
                CurrentAgent::Agent(kind) => kind,
            };

            if steps >= self.max_steps {
                tracing::warn!(limit = self.max_steps, history = ?state.agent_history, "Workflow budget exhausted");
                return Err(RunError::BudgetExceeded {
                    limit: self.max_steps,
                });
            }
            steps += 1;

            tracing::debug!("Workflow step {}: {}", steps, kind);
            emit(
                events,
                RunEvent::NodeEntered {
                    node: kind.to_string(),
                    step: steps,
                },
            );

            let before = state.messages.len();
            let node = self.node(kind);
            debug_assert_eq!(node.kind(), kind);
            node.execute(&mut state).await?;
            visits.push(kind);

            for message in &state.messages[before..] {
                emit(
                    events,
                    RunEvent::MessageAppended {
                        message: message.clone(),
                    },
                );
            }

            if kind.is_specialist() {
                // fixed edge back to the orchestrator
                state.hand_back();
                continue;
            }

            match (&state.current_agent, &state.final_answer) {
                (CurrentAgent::End, Some(answer)) => emit(
                    events,
                    RunEvent::Finalized {
                        answer: answer.clone(),
                    },
                ),
                (CurrentAgent::Agent(next), _) => emit(
                    events,
                    RunEvent::Routed {
                        agent: next.to_string(),
                    },
                ),
                _ => {}
            }
        }

        tracing::info!(steps, history = ?state.agent_history, "Workflow finished");
        Ok(WorkflowRun {
            state,
            visits,
            steps,
        })
    }
}
