//! Search-context builder: expand a query into sub-queries, search each, and
//! concatenate the hits into one block of context.
//!
//! The builder never answers the query; it only gathers text for a later prompt.

use std::sync::Arc;

use crate::error::ProviderError;
use crate::llm::{LlmClient, ModelSpec};

use super::SearchProvider;

/// Wording used to ask for sub-queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubQueryStyle {
    /// Context gathering for the tool loop's `web_search` tool.
    Tool,
    /// Research for the orchestrated search specialist.
    Research,
}

impl SubQueryStyle {
    pub fn prompt(self, query: &str) -> String {
        match self {
            SubQueryStyle::Tool => format!(
                "You are tasked with gathering context for the following query: {query}. \
                 Generate any additional questions or sub-queries that may help provide context, \
                 separated by a single comma with no spaces. \
                 If you don't need any additional sub-queries, just return the original query.\
                 Only return queries to help find information, not to answer the question."
            ),
            SubQueryStyle::Research => format!(
                "You are tasked with answering the following: {query}. \
                 Generate more questions you may need answers to in order to answer this questions \
                 and return all separated only by a single comma with no spaces.\
                 If you do not need anymore context, just return the query.\
                 This sub-query will be passed to a search engine to provide more context to answer this query.\
                 Ensure that you are using information that is the most up to date.\
                 If you are unsure, just return the query. Do not try to guess."
            ),
        }
    }
}

/// Output of one context build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchContext {
    /// Sub-queries actually sent to the search provider, in order.
    pub sub_queries: Vec<String>,
    /// Concatenated result contents, one per line. May be empty.
    pub text: String,
}

/// Split the model's sub-query list on commas.
///
/// Each segment is trimmed and stripped of double quotes; empty segments are
/// dropped. Falls back to `query` when nothing usable remains. A sub-query that
/// itself contains a comma is split too.
pub fn split_sub_queries(generated: &str, query: &str) -> Vec<String> {
    let sub_queries: Vec<String> = generated
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if sub_queries.is_empty() {
        vec![query.trim().trim_matches('"').to_string()]
    } else {
        sub_queries
    }
}

pub struct SearchContextBuilder {
    llm: Arc<dyn LlmClient>,
    search: Arc<dyn SearchProvider>,
    model: ModelSpec,
    max_results: usize,
}

impl SearchContextBuilder {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn SearchProvider>,
        model: ModelSpec,
        max_results: usize,
    ) -> Self {
        Self {
            llm,
            search,
            model,
            max_results,
        }
    }

    /// Model used for sub-query expansion.
    pub fn model(&self) -> &ModelSpec {
        &self.model
    }

    pub async fn build(
        &self,
        query: &str,
        style: SubQueryStyle,
    ) -> Result<SearchContext, ProviderError> {
        let generated = self.llm.complete(&self.model, &style.prompt(query)).await?;
        tracing::debug!(generated = %generated, "Generated sub-queries");

        let sub_queries = split_sub_queries(&generated, query);
        let mut text = String::new();

        for sub_query in &sub_queries {
            let results = self.search.search(sub_query, self.max_results).await?;
            tracing::debug!(
                provider = self.search.name(),
                sub_query = %sub_query,
                results = results.len(),
                "Search finished"
            );
            for result in results {
                text.push_str(&result.content);
                text.push('\n');
            }
        }

        Ok(SearchContext { sub_queries, text })
    }
}
