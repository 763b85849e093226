//! Configuration management for searchflow.
//!
//! Configuration can be set via environment variables:
//! - `OPENAI_API_KEY` - Required. API key for the chat-completion provider.
//! - `OPENAI_BASE_URL` - Optional. OpenAI-compatible base URL. Defaults to `https://api.openai.com/v1`.
//! - `TAVILY_API_KEY` - Optional. Enables Tavily search; DuckDuckGo is used otherwise.
//! - `CHAT_MODEL` - Optional. Model for the tool loop. Defaults to `gpt-3.5-turbo`.
//! - `SEARCH_AGENT_MODEL` - Optional. Model for the search specialist. Defaults to `gpt-4-turbo`.
//! - `ORCHESTRATOR_MODEL` - Optional. Defaults to `gpt-3.5-turbo`.
//! - `WRITER_MODEL` - Optional. Defaults to `gpt-3.5-turbo`.
//! - `EDITOR_MODEL` - Optional. Defaults to `gpt-3.5-turbo`.
//! - `SEARCH_MAX_RESULTS` - Optional. Results per search call. Defaults to `2`.
//! - `MAX_ITERATIONS` - Optional. Maximum tool loop iterations. Defaults to `25`.
//! - `MAX_WORKFLOW_STEPS` - Optional. Maximum orchestration steps. Defaults to `25`.
//! - `ROUTING_RETRIES` - Optional. Retries of a malformed routing answer. Defaults to `1`.
//! - `SUFFICIENCY_CHECK` - Optional. Ask the orchestrator whether it can finalize before routing. Defaults to `false`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. HTTP timeout for provider calls. Defaults to `120`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::llm::ModelSpec;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Model and sampling settings per agent role.
#[derive(Debug, Clone)]
pub struct ModelRoles {
    /// Tool loop chatbot and its sub-query expansion
    pub chat: ModelSpec,

    /// Search specialist (sub-queries and grounded answer)
    pub search: ModelSpec,

    /// Routing and finalization; deterministic
    pub orchestrator: ModelSpec,

    /// Creative drafting
    pub writer: ModelSpec,

    /// Deterministic review
    pub editor: ModelSpec,
}

impl Default for ModelRoles {
    fn default() -> Self {
        Self {
            chat: ModelSpec::new("gpt-3.5-turbo"),
            search: ModelSpec::new("gpt-4-turbo"),
            orchestrator: ModelSpec::new("gpt-3.5-turbo").with_temperature(0.0),
            writer: ModelSpec::new("gpt-3.5-turbo").with_temperature(0.7),
            editor: ModelSpec::new("gpt-3.5-turbo").with_temperature(0.0),
        }
    }
}

/// Search provider configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Tavily API key; DuckDuckGo HTML search is used when absent
    pub tavily_api_key: Option<String>,

    /// Results requested per search call
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tavily_api_key: None,
            max_results: 2,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat-completion API key
    pub api_key: String,

    /// OpenAI-compatible base URL
    pub base_url: String,

    /// Models per agent role
    pub models: ModelRoles,

    /// Search provider settings
    pub search: SearchConfig,

    /// Maximum chatbot iterations in the tool loop
    pub max_iterations: usize,

    /// Maximum node executions in the orchestrated workflow
    pub max_workflow_steps: usize,

    /// How many times a malformed routing answer is re-asked
    pub routing_retries: usize,

    /// Ask "enough information?" before each routing decision
    pub sufficiency_check: bool,

    /// Per-request HTTP timeout for providers
    pub request_timeout: Duration,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENAI_API_KEY` is not set, and
    /// `ConfigError::InvalidValue` for any numeric or boolean variable that fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let defaults = ModelRoles::default();
        let models = ModelRoles {
            chat: model_from_env("CHAT_MODEL", defaults.chat),
            search: model_from_env("SEARCH_AGENT_MODEL", defaults.search),
            orchestrator: model_from_env("ORCHESTRATOR_MODEL", defaults.orchestrator),
            writer: model_from_env("WRITER_MODEL", defaults.writer),
            editor: model_from_env("EDITOR_MODEL", defaults.editor),
        };

        let search = SearchConfig {
            tavily_api_key: std::env::var("TAVILY_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            max_results: parse_env("SEARCH_MAX_RESULTS", 2)?,
        };

        let timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", 120)?;

        let sufficiency_check = std::env::var("SUFFICIENCY_CHECK")
            .ok()
            .map(|v| {
                parse_bool(&v)
                    .map_err(|e| ConfigError::InvalidValue("SUFFICIENCY_CHECK".to_string(), e))
            })
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            api_key,
            base_url,
            models,
            search,
            max_iterations: parse_env("MAX_ITERATIONS", 25)?,
            max_workflow_steps: parse_env("MAX_WORKFLOW_STEPS", 25)?,
            routing_retries: parse_env("ROUTING_RETRIES", 1)?,
            sufficiency_check,
            request_timeout: Duration::from_secs(timeout_secs),
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_env("PORT", 3000)?,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            models: ModelRoles::default(),
            search: SearchConfig::default(),
            max_iterations: 25,
            max_workflow_steps: 25,
            routing_retries: 1,
            sufficiency_check: false,
            request_timeout: Duration::from_secs(120),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

fn model_from_env(var: &str, default: ModelSpec) -> ModelSpec {
    match std::env::var(var) {
        Ok(model) if !model.trim().is_empty() => ModelSpec {
            model: model.trim().to_string(),
            ..default
        },
        _ => default,
    }
}

fn parse_env<T>(var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(value) => parse_value(var, &value),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue(var.to_string(), format!("{}", e)))
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected boolean-like value, got: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roles_match_sampling_per_role() {
        let roles = ModelRoles::default();
        assert_eq!(roles.chat.model, "gpt-3.5-turbo");
        assert_eq!(roles.search.model, "gpt-4-turbo");
        assert_eq!(roles.orchestrator.temperature, Some(0.0));
        assert_eq!(roles.writer.temperature, Some(0.7));
        assert_eq!(roles.editor.temperature, Some(0.0));
        assert_eq!(roles.search.temperature, None);
    }

    #[test]
    fn new_config_is_bounded() {
        let config = Config::new("key".to_string());
        assert_eq!(config.max_iterations, 25);
        assert_eq!(config.max_workflow_steps, 25);
        assert_eq!(config.search.max_results, 2);
        assert!(!config.sufficiency_check);
    }

    #[test]
    fn parse_value_reports_variable_name() {
        let err = parse_value::<usize>("MAX_ITERATIONS", "lots").unwrap_err();
        match err {
            ConfigError::InvalidValue(var, _) => assert_eq!(var, "MAX_ITERATIONS"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(parse_value::<u16>("PORT", " 8080 ").unwrap(), 8080);
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert_eq!(parse_bool("Yes"), Ok(true));
        assert_eq!(parse_bool("off"), Ok(false));
        assert!(parse_bool("sometimes").is_err());
    }
}
