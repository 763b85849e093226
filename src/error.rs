//! Error taxonomy for agent runs.
//!
//! Every failure a run can end with is classified into an [`ErrorKind`] so the
//! CLI and the HTTP API can report it without inspecting message text.

use axum::http::StatusCode;
use thiserror::Error;

/// Failure talking to an external provider (chat completion or search).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("failed to decode {provider} response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn transport(provider: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { provider, source }
    }

    pub fn decode(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            provider,
            message: message.into(),
        }
    }

    /// Name of the provider that failed.
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Transport { provider, .. }
            | Self::Api { provider, .. }
            | Self::Decode { provider, .. } => provider,
        }
    }
}

/// Classification of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A provider call failed; the run cannot continue.
    FatalPerRun,
    /// The orchestrator answered outside the routing protocol.
    ProtocolViolation,
    /// The orchestrator named an agent that does not exist.
    RoutingFailure,
    /// The step or iteration bound was reached.
    BudgetExceeded,
}

/// Terminal error of a pipeline run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("protocol violation: orchestrator response contained neither 'AGENT:' nor 'FINALIZE': {response:?}")]
    ProtocolViolation { response: String },

    #[error("routing failure: unknown agent '{0}'")]
    UnknownAgent(String),

    #[error("budget exceeded: no terminal state after {limit} steps")]
    BudgetExceeded { limit: usize },

    #[error("LLM returned empty response")]
    EmptyResponse,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RunError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RunError::Provider(_) | RunError::EmptyResponse | RunError::InvalidInput(_) => {
                ErrorKind::FatalPerRun
            }
            RunError::ProtocolViolation { .. } => ErrorKind::ProtocolViolation,
            RunError::UnknownAgent(_) => ErrorKind::RoutingFailure,
            RunError::BudgetExceeded { .. } => ErrorKind::BudgetExceeded,
        }
    }

    /// Machine-readable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            RunError::Provider(_) => "provider_error",
            RunError::ProtocolViolation { .. } => "protocol_violation",
            RunError::UnknownAgent(_) => "routing_failure",
            RunError::BudgetExceeded { .. } => "budget_exceeded",
            RunError::EmptyResponse => "empty_response",
            RunError::InvalidInput(_) => "invalid_input",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RunError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            RunError::BudgetExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RunError::Provider(_)
            | RunError::ProtocolViolation { .. }
            | RunError::UnknownAgent(_)
            | RunError::EmptyResponse => StatusCode::BAD_GATEWAY,
        }
    }
}
