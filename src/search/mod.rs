//! Web search providers and the search-context builder.

mod context;
mod duckduckgo;
mod tavily;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::ProviderError;

pub use context::{split_sub_queries, SearchContext, SearchContextBuilder, SubQueryStyle};
pub use duckduckgo::DuckDuckGoSearch;
pub use tavily::TavilySearch;

/// One search hit. Only `content` feeds prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Search for `query`, returning at most `max_results` hits in rank order.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ProviderError>;
}

/// Pick Tavily when a key is configured, DuckDuckGo otherwise.
pub fn provider_from_config(
    config: &SearchConfig,
    timeout: Duration,
) -> Result<Arc<dyn SearchProvider>, ProviderError> {
    match &config.tavily_api_key {
        Some(key) => Ok(Arc::new(TavilySearch::new(key.clone(), timeout)?)),
        None => Ok(Arc::new(DuckDuckGoSearch::new(timeout)?)),
    }
}
