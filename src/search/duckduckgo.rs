//! DuckDuckGo HTML search (no API key needed).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;

use super::{SearchProvider, SearchResult};

const PROVIDER: &str = "duckduckgo";

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
}

impl DuckDuckGoSearch {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; searchflow/0.1)")
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, ProviderError> {
        let url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message: format!("HTTP error: {}", status),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        Ok(extract_results(&html, max_results))
    }
}

/// Extract search results from DuckDuckGo HTML.
fn extract_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for chunk in html.split("class=\"result__body\"").skip(1) {
        if results.len() >= max_results {
            break;
        }

        let title = tag_text(chunk, "class=\"result__a\"");
        let snippet = tag_text(chunk, "class=\"result__snippet\"").unwrap_or_default();
        let url = tag_text(chunk, "class=\"result__url\"").unwrap_or_default();

        match title {
            Some(title) if !title.is_empty() => results.push(SearchResult {
                title: html_decode(&title),
                url,
                content: html_decode(&snippet),
            }),
            _ => {}
        }
    }

    results
}

/// Inner text of the element carrying `marker`, up to its closing tag, with
/// inline markup such as `<b>` removed and whitespace collapsed.
fn tag_text(chunk: &str, marker: &str) -> Option<String> {
    let rest = chunk.split(marker).nth(1)?;
    let inner = &rest[rest.find('>')? + 1..];
    let end = ["</a>", "</div>", "</td>"]
        .iter()
        .filter_map(|close| inner.find(close))
        .min()
        .unwrap_or(inner.len());
    let text = strip_tags(&inner[..end]);
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

/// Basic HTML entity decoding.
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <div class="result__body">
          <a class="result__a" href="/l/?u=1">Home &amp; Hospital</a>
          <a class="result__url" href="/l/?u=1"> www.cna.example/read </a>
          <a class="result__snippet" href="/l/?u=1">Patients &quot;at home&quot; care</a>
        </div>
        <div class="result__body">
          <a class="result__a" href="/l/?u=2">Second</a>
          <a class="result__snippet" href="/l/?u=2">More text</a>
        </div>
        <div class="result__body">
          <a class="result__a" href="/l/?u=3">Third</a>
        </div>
    "#;

    #[test]
    fn extracts_title_url_and_snippet() {
        let results = extract_results(PAGE, 5);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Home & Hospital");
        assert_eq!(results[0].url, "www.cna.example/read");
        assert_eq!(results[0].content, "Patients \"at home\" care");
        assert_eq!(results[2].content, "");
    }

    #[test]
    fn keeps_text_around_highlighted_terms() {
        let page = r#"
            <div class="result__body">
              <a class="result__a" href="/l/?u=1">Lionel <b>Messi</b> - Wikipedia</a>
              <a class="result__url" href="/l/?u=1">en.wikipedia.org/wiki/Lionel_Messi</a>
              <a class="result__snippet" href="/l/?u=1">Lionel Andrés <b>Messi</b> is an
                Argentine professional footballer. His father, <b>Jorge</b> Messi&#x27;s son.</a>
            </div>
        "#;

        let results = extract_results(page, 2);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Lionel Messi - Wikipedia");
        assert_eq!(results[0].url, "en.wikipedia.org/wiki/Lionel_Messi");
        assert_eq!(
            results[0].content,
            "Lionel Andrés Messi is an Argentine professional footballer. \
             His father, Jorge Messi's son."
        );
    }

    #[test]
    fn respects_max_results() {
        assert_eq!(extract_results(PAGE, 2).len(), 2);
        assert!(extract_results("<html>no hits</html>", 2).is_empty());
    }
}
