pub mod acquire;
pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod publish;
pub mod script;
pub mod synth;
pub mod voice;

pub use config::{PipelineConfig, ProviderSettings};
pub use error::{FailureClass, PipelineError};
pub use pipeline::{GenerationJob, JobOutcome, JobRequest, JobStage, Pipeline};
