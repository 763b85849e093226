//! HTTP route handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::error::RunError;

use super::types::{
    ChatResponseBody, ErrorBody, HealthResponse, QueryRequest, WorkflowResponseBody,
};
use super::AppState;

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(err: RunError) -> ApiError {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(code = err.error_code(), "Run failed: {}", err);
    } else {
        tracing::warn!(code = err.error_code(), "Run rejected: {}", err);
    }
    (
        status,
        Json(ErrorBody {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }),
    )
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        search_provider: state.search_provider.clone(),
    })
}

/// Run the single-tool chat loop for one query.
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let run = state
        .chat
        .run_task(&req.query, None)
        .await
        .map_err(api_error)?;
    Ok(Json(ChatResponseBody::from_run(run)))
}

/// Run the orchestrated workflow for one query.
pub async fn post_workflow(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<WorkflowResponseBody>, ApiError> {
    let run = state
        .workflow
        .run(&req.query, None)
        .await
        .map_err(api_error)?;
    Ok(Json(WorkflowResponseBody::from_run(run)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ChatAgent;
    use crate::agents::{TaskStatus, Workflow};
    use crate::config::Config;
    use crate::llm::ChatResponse;
    use crate::test_support::{tool_call_response, RecordingSearch, ScriptedLlm};

    fn app_state(chat_llm: ScriptedLlm, workflow_llm: ScriptedLlm) -> Arc<AppState> {
        let config = Config::new("test".to_string());
        let search = Arc::new(RecordingSearch::with_content("result"));
        Arc::new(AppState {
            chat: ChatAgent::from_config(&config, Arc::new(chat_llm), search.clone()),
            workflow: Workflow::from_config(&config, Arc::new(workflow_llm), search),
            search_provider: "recording".to_string(),
            config,
        })
    }

    fn silent() -> ScriptedLlm {
        ScriptedLlm::texts(Vec::<String>::new())
    }

    fn query(q: &str) -> Json<QueryRequest> {
        Json(QueryRequest {
            query: q.to_string(),
        })
    }

    #[tokio::test]
    async fn health_reports_provider() {
        let state = app_state(silent(), silent());
        let Json(body) = health(State(state)).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.search_provider, "recording");
    }

    #[tokio::test]
    async fn chat_returns_answer_and_log() {
        let chat = ScriptedLlm::responses([
            tool_call_response("call_1", "web_search", r#"{"query":"Messi"}"#),
            ChatResponse::text("Messi"),
            ChatResponse::text("Lionel Messi is a footballer."),
        ]);
        let state = app_state(chat, silent());

        let Json(body) = post_chat(State(state), query("Who is Messi?"))
            .await
            .unwrap();

        assert_eq!(body.answer, "Lionel Messi is a footballer.");
        assert_eq!(body.tool_visits, 1);
        assert_eq!(body.iterations, 2);
    }

    #[tokio::test]
    async fn blank_query_is_bad_request() {
        let state = app_state(silent(), silent());

        let (status, Json(body)) = post_workflow(State(state), query("   ")).await.unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "invalid_input");
    }

    #[tokio::test]
    async fn workflow_returns_final_answer() {
        let workflow = ScriptedLlm::texts(["FINALIZE", "Final answer."]);
        let state = app_state(silent(), workflow);

        let Json(body) = post_workflow(State(state), query("Who is Messi?"))
            .await
            .unwrap();

        assert_eq!(body.final_answer.as_deref(), Some("Final answer."));
        assert_eq!(body.task_status, TaskStatus::Complete);
        assert_eq!(body.steps, 1);
        assert!(body.agent_history.is_empty());
    }

    #[tokio::test]
    async fn unknown_agent_is_bad_gateway() {
        let workflow = ScriptedLlm::texts(["AGENT: critic"]);
        let state = app_state(silent(), workflow);

        let (status, Json(body)) = post_workflow(State(state), query("Who is Messi?"))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "routing_failure");
        assert!(body.message.contains("critic"));
    }
}
