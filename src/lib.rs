//! # searchflow
//!
//! Two LLM + web-search pipelines over an OpenAI-compatible chat API.
//!
//! This library provides:
//! - [`agent`]: a single-tool chat loop that alternates between the model and
//!   a `web_search` tool until the model answers without calling a tool
//! - [`agents`]: an orchestrator that routes between web search, writer and
//!   editor specialists and decides when to finalize
//! - [`api`]: an HTTP API exposing both
//!
//! Both pipelines gather search context the same way: the model expands the
//! query into comma-separated sub-queries, each sub-query is searched, and the
//! result contents are concatenated.
//!
//! ## Example
//!
//! ```rust,ignore
//! use searchflow::{agents::Workflow, llm::OpenAiClient, search, Config};
//!
//! let config = Config::from_env()?;
//! let llm = Arc::new(OpenAiClient::new(config.api_key.clone(), &config.base_url, config.request_timeout)?);
//! let search = search::provider_from_config(&config.search, config.request_timeout)?;
//! let run = Workflow::from_config(&config, llm, search).run("Who is Leo Messi?", None).await?;
//! ```

pub mod agent;
pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod llm;
pub mod search;
pub mod tools;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{ErrorKind, ProviderError, RunError};
