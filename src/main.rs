//! searchflow - command-line entry point.
//!
//! ```text
//! searchflow chat [QUERY]       run the single-tool chat loop
//! searchflow workflow [QUERY]   run the orchestrated workflow
//! searchflow serve              start the HTTP API
//! ```

use std::sync::Arc;

use anyhow::bail;
use searchflow::agent::ChatAgent;
use searchflow::agents::Workflow;
use searchflow::events::RunEvent;
use searchflow::llm::{LlmClient, OpenAiClient};
use searchflow::search::{self, SearchProvider};
use searchflow::{api, config::Config};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CHAT_DEMO_QUERY: &str =
    "Tell me about the cna article: The Big Read: When home is where the hospital bed is.";
const WORKFLOW_DEMO_QUERY: &str = "Who is Leo Messi and what is his father's name and age?";

const USAGE: &str = "usage: searchflow <chat|workflow|serve> [QUERY]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "searchflow=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "serve".to_string());
    let query = {
        let rest: Vec<String> = args.collect();
        (!rest.is_empty()).then(|| rest.join(" "))
    };

    let config = Config::from_env()?;
    info!(
        "Loaded configuration: chat_model={}, orchestrator_model={}",
        config.models.chat.model, config.models.orchestrator.model
    );

    match command.as_str() {
        "serve" => {
            info!("Starting server on {}:{}", config.host, config.port);
            api::serve(config).await
        }
        "chat" => {
            let (llm, search) = clients(&config)?;
            let agent = ChatAgent::from_config(&config, llm, search);
            let query = query.unwrap_or_else(|| CHAT_DEMO_QUERY.to_string());

            let (tx, printer) = spawn_printer();
            let result = agent.run_task(&query, Some(&tx)).await;
            drop(tx);
            let _ = printer.await;

            let run = result?;
            println!("\n{}", run.answer);
            Ok(())
        }
        "workflow" => {
            let (llm, search) = clients(&config)?;
            let workflow = Workflow::from_config(&config, llm, search);
            let query = query.unwrap_or_else(|| WORKFLOW_DEMO_QUERY.to_string());

            let (tx, printer) = spawn_printer();
            let result = workflow.run(&query, Some(&tx)).await;
            drop(tx);
            let _ = printer.await;

            let run = result?;
            if let Some(answer) = run.state.final_answer {
                println!("\n{}", answer);
            }
            Ok(())
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}

fn clients(config: &Config) -> anyhow::Result<(Arc<dyn LlmClient>, Arc<dyn SearchProvider>)> {
    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(
        config.api_key.clone(),
        &config.base_url,
        config.request_timeout,
    )?);
    let search = search::provider_from_config(&config.search, config.request_timeout)?;
    info!("Using search provider: {}", search.name());
    Ok((llm, search))
}

/// Prints each step's latest message as it happens.
fn spawn_printer() -> (
    mpsc::UnboundedSender<RunEvent>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                RunEvent::NodeEntered { node, step } => println!("--- [{}] {} ---", step, node),
                RunEvent::MessageAppended { message } => {
                    println!("{:?}: {}", message.role, message.content_str())
                }
                RunEvent::ToolCall { name, args, .. } => println!("tool call: {} {}", name, args),
                RunEvent::Routed { agent } => println!("routed to {}", agent),
                RunEvent::ToolResult { .. } | RunEvent::Finalized { .. } => {}
            }
        }
    });
    (tx, handle)
}
