use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use uuid::Uuid;

use super::ProviderError;

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload one object; the store derives the key. Returns a public URL.
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, ProviderError>;
}

/// Object-storage client. Keys are uuid-based so re-publishing the same
/// bytes always lands on a fresh object.
pub struct StorageClient {
    client: Client,
    base_url: String,
    bucket: String,
    public_base: String,
}

impl StorageClient {
    pub fn new(base_url: &str, bucket: &str, public_base: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    fn key_for(content_type: &str) -> String {
        let (prefix, ext) = match content_type {
            "audio/wav" => ("audio", "wav"),
            "text/plain" => ("transcripts", "txt"),
            "application/json" => ("meta", "json"),
            _ => ("objects", "bin"),
        };
        format!("{}/{}.{}", prefix, Uuid::new_v4(), ext)
    }
}

#[async_trait]
impl ArtifactStore for StorageClient {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String, ProviderError> {
        let key = Self::key_for(content_type);
        let response = self
            .client
            .put(format!("{}/{}/{}", self.base_url, self.bucket, key))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::UploadFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::UploadFailed(format!(
                "status {}",
                response.status()
            )));
        }

        Ok(format!("{}/{}", self.public_base, key))
    }
}
