//! HTTP API exposing both pipelines.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `POST /api/chat` - Run the single-tool chat loop for `{"query": ...}`
//! - `POST /api/workflow` - Run the orchestrated workflow for `{"query": ...}`

mod routes;
pub mod types;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::agent::ChatAgent;
use crate::agents::Workflow;
use crate::config::Config;
use crate::llm::{LlmClient, OpenAiClient};
use crate::search::{self, SearchProvider};

/// Shared server state.
pub struct AppState {
    pub config: Config,
    pub chat: ChatAgent,
    pub workflow: Workflow,
    /// Name of the active search provider
    pub search_provider: String,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn LlmClient>, search: Arc<dyn SearchProvider>) -> Self {
        Self {
            chat: ChatAgent::from_config(&config, llm.clone(), search.clone()),
            workflow: Workflow::from_config(&config, llm, search.clone()),
            search_provider: search.name().to_string(),
            config,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/chat", post(routes::post_chat))
        .route("/api/workflow", post(routes::post_workflow))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let llm = Arc::new(OpenAiClient::new(
        config.api_key.clone(),
        &config.base_url,
        config.request_timeout,
    )?);
    let search = search::provider_from_config(&config.search, config.request_timeout)?;

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config, llm, search));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
