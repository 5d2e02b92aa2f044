use chrono::{DateTime, Utc};
use tracing::{error, info};
use uuid::Uuid;

use crate::acquire::InputSource;
use crate::audio::TimelineEntry;
use crate::error::PipelineError;
use crate::publish::PublishedRefs;
use crate::script::StyleDirectives;

/// Stage ladder. Transitions are one-directional with no re-entry;
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Queued,
    Acquiring,
    Composing,
    AssigningVoices,
    Synthesizing,
    Assembling,
    Publishing,
    Completed,
    Failed,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Queued => "queued",
            JobStage::Acquiring => "acquiring",
            JobStage::Composing => "composing",
            JobStage::AssigningVoices => "assigning_voices",
            JobStage::Synthesizing => "synthesizing",
            JobStage::Assembling => "assembling",
            JobStage::Publishing => "publishing",
            JobStage::Completed => "completed",
            JobStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Completed | JobStage::Failed)
    }
}

/// One end-to-end request as the caller hands it over.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub input: InputSource,
    pub style: StyleDirectives,
    /// Explicit music track id; `None` selects the configured default.
    pub music_track: Option<String>,
    /// Synthesis speed in -2..=2, clamped at intake.
    pub speech_speed: i8,
}

impl JobRequest {
    pub fn new(input: InputSource) -> Self {
        Self {
            input,
            style: StyleDirectives::default(),
            music_track: None,
            speech_speed: 0,
        }
    }
}

/// What a completed job hands back to the caller.
#[derive(Debug, Clone)]
pub struct PublishedPodcast {
    pub refs: PublishedRefs,
    pub duration_ms: u64,
    pub timeline: Vec<TimelineEntry>,
    pub music_track: Option<String>,
}

#[derive(Debug)]
pub enum JobOutcome {
    Completed(PublishedPodcast),
    Failed {
        stage: JobStage,
        error: PipelineError,
    },
}

/// One generation job, exclusively owned by its run of the pipeline and
/// mutated only through stage transitions.
#[derive(Debug)]
pub struct GenerationJob {
    pub id: Uuid,
    pub request: JobRequest,
    pub stage: JobStage,
    pub created_at: DateTime<Utc>,
    pub outcome: Option<JobOutcome>,
}

impl GenerationJob {
    pub fn new(mut request: JobRequest) -> Self {
        request.speech_speed = request.speech_speed.clamp(-2, 2);
        Self {
            id: Uuid::new_v4(),
            request,
            stage: JobStage::Queued,
            created_at: Utc::now(),
            outcome: None,
        }
    }

    pub(crate) fn advance(&mut self, stage: JobStage) {
        debug_assert!(!self.stage.is_terminal());
        info!(job = %self.id, from = self.stage.as_str(), to = stage.as_str(), "stage transition");
        self.stage = stage;
    }

    pub(crate) fn complete(&mut self, podcast: PublishedPodcast) {
        self.advance(JobStage::Completed);
        self.outcome = Some(JobOutcome::Completed(podcast));
    }

    /// Record the first stage failure as the job's terminal result.
    pub(crate) fn fail(&mut self, error: PipelineError) {
        let stage = self.stage;
        error!(
            job = %self.id,
            stage = stage.as_str(),
            class = ?error.class(),
            %error,
            "job failed"
        );
        self.advance(JobStage::Failed);
        self.outcome = Some(JobOutcome::Failed { stage, error });
    }
}
