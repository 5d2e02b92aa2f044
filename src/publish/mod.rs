use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::audio::PodcastArtifact;
use crate::error::PipelineError;
use crate::providers::{ArtifactStore, ProviderError};

const UPLOAD_BACKOFF_MS: u64 = 500;

/// Durable references to the published assets.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedRefs {
    pub audio_url: String,
    pub transcript_url: String,
    pub timeline_url: String,
}

/// Persists the finished artifact: the audio itself, plus the transcript
/// and timeline as derived assets. Transient upload failures are retried
/// with doubling backoff; exhaustion fails the stage.
pub struct ArtifactPublisher {
    store: Arc<dyn ArtifactStore>,
    retry_limit: u32,
}

impl ArtifactPublisher {
    pub fn new(store: Arc<dyn ArtifactStore>, retry_limit: u32) -> Self {
        Self { store, retry_limit }
    }

    pub async fn publish(&self, artifact: &PodcastArtifact) -> Result<PublishedRefs, PipelineError> {
        let wav = artifact
            .wav_bytes()
            .map_err(|e| PipelineError::UploadFailed(format!("wav serialization: {e}")))?;
        let timeline = serde_json::to_vec_pretty(&artifact.timeline)
            .map_err(|e| PipelineError::UploadFailed(format!("timeline serialization: {e}")))?;

        let audio_url = self.upload_with_retry(wav, "audio/wav").await?;
        let transcript_url = self
            .upload_with_retry(artifact.transcript.clone().into_bytes(), "text/plain")
            .await?;
        let timeline_url = self.upload_with_retry(timeline, "application/json").await?;

        info!(audio = %audio_url, "artifact published");
        Ok(PublishedRefs {
            audio_url,
            transcript_url,
            timeline_url,
        })
    }

    async fn upload_with_retry(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, PipelineError> {
        let mut attempt = 0u32;
        loop {
            match self.store.upload(bytes.clone(), content_type).await {
                Ok(url) => return Ok(url),
                Err(e) if e.is_transient() && attempt < self.retry_limit => {
                    let backoff = UPLOAD_BACKOFF_MS << attempt;
                    warn!(content_type, attempt, error = %e, backoff_ms = backoff, "upload failed, retrying");
                    sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
                Err(e) => return Err(map_upload_error(e)),
            }
        }
    }
}

fn map_upload_error(e: ProviderError) -> PipelineError {
    PipelineError::UploadFailed(e.to_string())
}
