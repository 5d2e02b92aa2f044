use std::sync::Arc;

use tracing::{info, warn};

use crate::acquire::SourceAcquirer;
use crate::audio::{assemble, AssemblyParams, MusicBed};
use crate::config::PipelineConfig;
use crate::providers::{
    ArtifactStore, ContentExtractor, DocumentIngestor, ScriptGenerator, SearchProvider,
    SpeechSynthesizer,
};
use crate::publish::ArtifactPublisher;
use crate::script::ScriptComposer;
use crate::synth::SynthesisCoordinator;
use crate::voice::assign_voices;

use super::job::{GenerationJob, JobRequest, JobStage, PublishedPodcast};

/// Sequences the stages of one job and converts the first stage failure
/// into the job's terminal result. No driver-level retry: each component
/// already retries its own external calls.
pub struct Pipeline {
    config: PipelineConfig,
    acquirer: SourceAcquirer,
    composer: ScriptComposer,
    coordinator: SynthesisCoordinator,
    publisher: ArtifactPublisher,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PipelineConfig,
        search: Arc<dyn SearchProvider>,
        extractor: Arc<dyn ContentExtractor>,
        ingestor: Arc<dyn DocumentIngestor>,
        generator: Arc<dyn ScriptGenerator>,
        tts: Arc<dyn SpeechSynthesizer>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        let acquirer = SourceAcquirer::new(
            search,
            extractor,
            ingestor,
            generator.clone(),
            config.clone(),
        );
        let composer = ScriptComposer::new(generator, config.clone());
        let coordinator = SynthesisCoordinator::new(tts, config.clone());
        let publisher = ArtifactPublisher::new(store, config.upload_retry_limit);
        Self {
            config,
            acquirer,
            composer,
            coordinator,
            publisher,
        }
    }

    /// Run one job to a terminal state. Once started it is never
    /// abandoned mid-stage; the result is always `Completed` or `Failed`.
    pub async fn run(&self, request: JobRequest) -> GenerationJob {
        let mut job = GenerationJob::new(request);
        info!(job = %job.id, kind = job.request.input.kind(), "job started");

        job.advance(JobStage::Acquiring);
        let documents = match self.acquirer.acquire(&job.request.input).await {
            Ok(documents) => documents,
            Err(e) => {
                job.fail(e);
                return job;
            }
        };

        job.advance(JobStage::Composing);
        let topic = job.request.input.topic_line();
        let turns = match self
            .composer
            .compose(&topic, &documents, &job.request.style)
            .await
        {
            Ok(turns) => turns,
            Err(e) => {
                job.fail(e);
                return job;
            }
        };

        job.advance(JobStage::AssigningVoices);
        let assignment = match assign_voices(&turns, &self.config.voice_pool) {
            Ok(assignment) => assignment,
            Err(e) => {
                job.fail(e);
                return job;
            }
        };

        job.advance(JobStage::Synthesizing);
        let segments = match self
            .coordinator
            .synthesize_all(&turns, &assignment, job.request.speech_speed)
            .await
        {
            Ok(segments) => segments,
            Err(e) => {
                job.fail(e);
                return job;
            }
        };

        job.advance(JobStage::Assembling);
        let bed = self.load_music_bed(job.request.music_track.as_deref());
        let artifact = assemble(segments, bed.as_ref(), &AssemblyParams::from(&self.config));

        job.advance(JobStage::Publishing);
        match self.publisher.publish(&artifact).await {
            Ok(refs) => {
                job.complete(PublishedPodcast {
                    refs,
                    duration_ms: artifact.duration_ms,
                    timeline: artifact.timeline,
                    music_track: artifact.music_track,
                });
            }
            Err(e) => job.fail(e),
        }
        job
    }

    /// Resolve and decode the music bed. The assembler does no IO, so the
    /// file is read here; an unknown track falls back to the default and
    /// an unreadable file degrades to no bed rather than failing the job.
    fn load_music_bed(&self, selection: Option<&str>) -> Option<MusicBed> {
        let track_id = match selection {
            Some(id) if self.config.music_tracks.contains_key(id) => id,
            Some(id) => {
                warn!(track = id, "unknown music track, using default");
                self.config.default_music_track.as_str()
            }
            None => self.config.default_music_track.as_str(),
        };
        let path = self.config.music_tracks.get(track_id)?;
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(track = track_id, path = %path.display(), error = %e, "music track unreadable, mixing without bed");
                return None;
            }
        };
        match MusicBed::from_wav_bytes(track_id, &bytes) {
            Ok(bed) => Some(bed),
            Err(e) => {
                warn!(track = track_id, error = %e, "music track undecodable, mixing without bed");
                None
            }
        }
    }
}
