pub mod extract;
pub mod generate;
pub mod search;
pub mod storage;
pub mod tts;

pub use extract::{ContentExtractor, DocumentIngestor, DocumentKind, ExtractMode, ExtractorClient};
pub use generate::{ScriptGenerator, ScriptModelClient};
pub use search::{SearchHit, SearchProvider, WebSearchClient};
pub use storage::{ArtifactStore, StorageClient};
pub use tts::{SpeechClient, SpeechSynthesizer};

use thiserror::Error;

/// Failures at the provider boundary. Components decide retry policy
/// from `is_transient`; the classification survives into the job result.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("ingestion failed: {0}")]
    IngestionFailed(String),

    #[error("generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("synthesis unavailable: {0}")]
    SynthesisUnavailable(String),

    #[error("voice not accepted by synthesizer: {0}")]
    InvalidVoice(String),

    #[error("text rejected by synthesizer: {0}")]
    InvalidText(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("request timed out")]
    Timeout,
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::SearchUnavailable(_)
            | ProviderError::ExtractionFailed(_)
            | ProviderError::GenerationUnavailable(_)
            | ProviderError::SynthesisUnavailable(_)
            | ProviderError::UploadFailed(_)
            | ProviderError::Timeout => true,
            ProviderError::IngestionFailed(_)
            | ProviderError::InvalidVoice(_)
            | ProviderError::InvalidText(_) => false,
        }
    }
}
