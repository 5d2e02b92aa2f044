use thiserror::Error;

/// Whether retrying the same job could plausibly succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transient,
    Permanent,
}

/// Stage-level failures. The driver records the first of these together
/// with the stage it came from; no stage recovers from another's failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source acquisition failed: {reason}")]
    AcquisitionFailed { reason: String, class: FailureClass },

    #[error("script response unparsable after {attempts} attempts: {reason}")]
    ScriptParse { reason: String, attempts: u32 },

    #[error("script generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("voice pool is empty")]
    InsufficientVoicePool,

    #[error("synthesis failed at turn {turn}: {reason}")]
    SynthesisFailed {
        turn: usize,
        reason: String,
        class: FailureClass,
    },

    #[error("artifact upload failed: {0}")]
    UploadFailed(String),
}

impl PipelineError {
    pub fn class(&self) -> FailureClass {
        match self {
            PipelineError::AcquisitionFailed { class, .. } => *class,
            PipelineError::ScriptParse { .. } => FailureClass::Permanent,
            PipelineError::GenerationUnavailable(_) => FailureClass::Transient,
            PipelineError::InsufficientVoicePool => FailureClass::Permanent,
            PipelineError::SynthesisFailed { class, .. } => *class,
            PipelineError::UploadFailed(_) => FailureClass::Transient,
        }
    }
}
