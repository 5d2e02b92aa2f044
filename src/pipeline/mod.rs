pub mod driver;
pub mod job;

pub use driver::Pipeline;
pub use job::{GenerationJob, JobOutcome, JobRequest, JobStage, PublishedPodcast};
