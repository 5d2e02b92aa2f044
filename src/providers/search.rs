use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ProviderError;

/// One web search result, relevance order preserved from the provider.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub snippet: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>, ProviderError>;
}

pub struct WebSearchClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    count: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHitWire>,
}

#[derive(Deserialize)]
struct SearchHitWire {
    #[serde(default)]
    url: String,
    #[serde(default, alias = "name")]
    title: String,
    #[serde(default, alias = "summary")]
    snippet: String,
}

impl WebSearchClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for WebSearchClient {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchHit>, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1/web-search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&SearchRequest { query, count })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::SearchUnavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::SearchUnavailable(format!(
                "status {}",
                response.status()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::SearchUnavailable(e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .filter(|hit| !hit.url.is_empty())
            .map(|hit| SearchHit {
                url: hit.url,
                title: hit.title,
                snippet: hit.snippet,
            })
            .collect())
    }
}
