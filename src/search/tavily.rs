use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

use super::{SearchProvider, SearchResult};

const PROVIDER: &str = "tavily";
const SEARCH_URL: &str = "https://api.tavily.com/search";

/// Tavily search API client.
pub struct TavilySearch {
    api_key: String,
    client: reqwest::Client,
}

impl TavilySearch {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;
        Ok(Self { api_key, client })
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

fn parse_results(body: &str, max_results: usize) -> Result<Vec<SearchResult>, ProviderError> {
    let parsed: TavilyResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))?;
    Ok(parsed
        .results
        .into_iter()
        .take(max_results)
        .map(|r| SearchResult {
            title: r.title,
            url: r.url,
            content: r.content,
        })
        .collect())
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            max_results,
        };

        let response = self
            .client
            .post(SEARCH_URL)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message: body,
            });
        }

        parse_results(&body, max_results)
    }
}
