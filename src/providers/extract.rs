use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ProviderError;

/// Static is a plain fetch; Rendered runs the page in a headless browser
/// before extraction. Rendered is the fallback for script-built pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    Static,
    Rendered,
}

impl ExtractMode {
    fn as_str(&self) -> &'static str {
        match self {
            ExtractMode::Static => "static",
            ExtractMode::Rendered => "rendered",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Text => "text",
        }
    }
}

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, url: &str, mode: ExtractMode) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait DocumentIngestor: Send + Sync {
    async fn ingest(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ProviderError>;
}

/// Client for the extraction sidecar, which wraps both URL extraction
/// and document ingestion behind one service.
pub struct ExtractorClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    url: &'a str,
    mode: &'a str,
}

#[derive(Serialize)]
struct IngestRequest<'a> {
    data: String,
    kind: &'a str,
}

#[derive(Deserialize)]
struct TextResponse {
    #[serde(default)]
    text: String,
}

impl ExtractorClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ContentExtractor for ExtractorClient {
    async fn extract(&self, url: &str, mode: ExtractMode) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/extract", self.base_url))
            .json(&ExtractRequest {
                url,
                mode: mode.as_str(),
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::ExtractionFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::ExtractionFailed(format!(
                "status {}",
                response.status()
            )));
        }

        let parsed: TextResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ExtractionFailed(e.to_string()))?;
        Ok(parsed.text)
    }
}

#[async_trait]
impl DocumentIngestor for ExtractorClient {
    async fn ingest(&self, bytes: &[u8], kind: DocumentKind) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/ingest", self.base_url))
            .json(&IngestRequest {
                data: BASE64.encode(bytes),
                kind: kind.as_str(),
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::IngestionFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::IngestionFailed(format!(
                "status {}",
                response.status()
            )));
        }

        let parsed: TextResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::IngestionFailed(e.to_string()))?;
        Ok(parsed.text)
    }
}
