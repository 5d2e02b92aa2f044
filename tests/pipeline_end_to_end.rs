use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use podforge::acquire::InputSource;
use podforge::audio::wav::encode_wav;
use podforge::pipeline::{JobOutcome, JobRequest, JobStage, Pipeline};
use podforge::providers::{
    ArtifactStore, ContentExtractor, DocumentIngestor, DocumentKind, ExtractMode, ProviderError,
    ScriptGenerator, SearchHit, SearchProvider, SpeechSynthesizer,
};
use podforge::voice::VoiceIdentity;
use podforge::{PipelineConfig, PipelineError};

const SAMPLE_RATE: u32 = 16_000;

// ---- fakes ----------------------------------------------------------------

struct NoSearch;

#[async_trait]
impl SearchProvider for NoSearch {
    async fn search(&self, _query: &str, _count: usize) -> Result<Vec<SearchHit>, ProviderError> {
        Ok(Vec::new())
    }
}

struct NoExtract;

#[async_trait]
impl ContentExtractor for NoExtract {
    async fn extract(&self, url: &str, _mode: ExtractMode) -> Result<String, ProviderError> {
        Err(ProviderError::ExtractionFailed(url.to_string()))
    }
}

#[async_trait]
impl DocumentIngestor for NoExtract {
    async fn ingest(&self, _bytes: &[u8], _kind: DocumentKind) -> Result<String, ProviderError> {
        Err(ProviderError::IngestionFailed("corrupt file".to_string()))
    }
}

struct ScriptedGenerator {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(str::to_string).collect()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ScriptGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::GenerationUnavailable("out of responses".to_string()))
    }
}

/// 100 ms per request; any text containing "poison" always fails.
struct FixedTts;

#[async_trait]
impl SpeechSynthesizer for FixedTts {
    async fn synthesize(
        &self,
        text: &str,
        _voice_id: &str,
        _speed: i8,
    ) -> Result<Vec<u8>, ProviderError> {
        if text.contains("poison") {
            return Err(ProviderError::SynthesisUnavailable("simulated 503".to_string()));
        }
        Ok(encode_wav(&vec![1500i16; SAMPLE_RATE as usize / 10], SAMPLE_RATE).unwrap())
    }
}

struct MemoryStore {
    uploads: Mutex<Vec<String>>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
        }
    }

    fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn upload(&self, _bytes: Vec<u8>, content_type: &str) -> Result<String, ProviderError> {
        let mut uploads = self.uploads.lock().unwrap();
        let url = format!("mem://artifacts/{}/{}", uploads.len(), content_type);
        uploads.push(url.clone());
        Ok(url)
    }
}

// ---- harness --------------------------------------------------------------

fn config() -> PipelineConfig {
    PipelineConfig {
        max_extra_queries: 0,
        synth_backoff_ms: 1,
        synth_retry_limit: 1,
        script_retry_limit: 2,
        voice_pool: vec![
            VoiceIdentity::new("501006", "Aiden"),
            VoiceIdentity::new("601007", "Mora"),
        ],
        pause_ms: 200,
        lead_in_ms: 100,
        ..PipelineConfig::default()
    }
}

fn pipeline_with(
    generator: Arc<ScriptedGenerator>,
    store: Arc<MemoryStore>,
) -> Pipeline {
    let extract = Arc::new(NoExtract);
    Pipeline::new(
        config(),
        Arc::new(NoSearch),
        extract.clone(),
        extract,
        generator,
        Arc::new(FixedTts),
        store,
    )
}

const FOUR_TURNS: &str = "ALEX: Welcome, today we cover tidal power.\n\
JORDAN: I've been looking forward to this one.\n\
ALEX: Tidal turbines work like underwater windmills.\n\
JORDAN: Thanks for listening, see you next week.";

// ---- scenarios ------------------------------------------------------------

#[tokio::test]
async fn scenario_a_text_input_produces_ordered_podcast() {
    let generator = Arc::new(ScriptedGenerator::new(vec![FOUR_TURNS]));
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(generator, store.clone());

    let request = JobRequest::new(InputSource::Text(
        "Tidal power stations capture energy from the rise and fall of the sea. \
Prototype turbines in several estuaries already feed the grid."
            .to_string(),
    ));
    let job = pipeline.run(request).await;

    assert_eq!(job.stage, JobStage::Completed);
    let podcast = match job.outcome {
        Some(JobOutcome::Completed(podcast)) => podcast,
        other => panic!("expected completion, got {other:?}"),
    };

    // Four 100 ms segments, three 200 ms pauses, 100 ms lead-in.
    assert_eq!(podcast.timeline.len(), 4);
    let starts: Vec<u64> = podcast.timeline.iter().map(|t| t.start_ms).collect();
    assert_eq!(starts, vec![100, 400, 700, 1000]);
    assert_eq!(podcast.duration_ms, 1100);

    // Two speakers alternating → exactly two distinct voices.
    let speakers: Vec<&str> = podcast.timeline.iter().map(|t| t.speaker.as_str()).collect();
    assert_eq!(speakers, vec!["ALEX", "JORDAN", "ALEX", "JORDAN"]);

    // Audio + transcript + timeline all published.
    assert_eq!(store.upload_count(), 3);
    assert!(podcast.refs.audio_url.starts_with("mem://"));
}

#[tokio::test]
async fn scenario_b_nothing_acquirable_fails_in_acquiring() {
    let generator = Arc::new(ScriptedGenerator::new(vec![FOUR_TURNS]));
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(generator, store.clone());

    // Search yields nothing usable for the topic.
    let topic_job = pipeline
        .run(JobRequest::new(InputSource::Topic("anything".to_string())))
        .await;
    match topic_job.outcome {
        Some(JobOutcome::Failed { stage, error }) => {
            assert_eq!(stage, JobStage::Acquiring);
            assert!(matches!(error, PipelineError::AcquisitionFailed { .. }));
        }
        other => panic!("expected acquisition failure, got {other:?}"),
    }

    // Document ingestion fails outright.
    let doc_job = pipeline
        .run(JobRequest::new(InputSource::Document {
            name: "notes.pdf".to_string(),
            bytes: vec![0, 1, 2],
        }))
        .await;
    match doc_job.outcome {
        Some(JobOutcome::Failed { stage, error }) => {
            assert_eq!(stage, JobStage::Acquiring);
            assert!(matches!(error, PipelineError::AcquisitionFailed { .. }));
        }
        other => panic!("expected acquisition failure, got {other:?}"),
    }
    assert_eq!(store.upload_count(), 0);
}

#[tokio::test]
async fn scenario_c_exhausted_turn_fails_job_and_publishes_nothing() {
    let script = "ALEX: First turn is fine.\n\
JORDAN: Second turn is fine.\n\
ALEX: This turn is poison for the synthesizer.\n\
JORDAN: Fourth turn is fine.\n\
ALEX: Fifth turn is fine.";
    let generator = Arc::new(ScriptedGenerator::new(vec![script]));
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(generator, store.clone());

    let job = pipeline
        .run(JobRequest::new(InputSource::Text(
            "Source material for a five turn script.".to_string(),
        )))
        .await;

    match job.outcome {
        Some(JobOutcome::Failed { stage, error }) => {
            assert_eq!(stage, JobStage::Synthesizing);
            match error {
                PipelineError::SynthesisFailed { turn, .. } => assert_eq!(turn, 2),
                other => panic!("expected SynthesisFailed, got {other:?}"),
            }
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(store.upload_count(), 0, "no partial podcast may be published");
}

#[tokio::test]
async fn scenario_d_third_generation_attempt_carries_the_job() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        "Here is an outline of the topics instead of a script.",
        "# Heading\n- bullet one\n- bullet two",
        FOUR_TURNS,
    ]));
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(generator.clone(), store.clone());

    let job = pipeline
        .run(JobRequest::new(InputSource::Text(
            "Enough source material to write about.".to_string(),
        )))
        .await;

    assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    assert_eq!(job.stage, JobStage::Completed);
    assert_eq!(store.upload_count(), 3);
}

#[tokio::test]
async fn empty_voice_pool_fails_before_synthesis() {
    let generator = Arc::new(ScriptedGenerator::new(vec![FOUR_TURNS]));
    let store = Arc::new(MemoryStore::new());
    let extract = Arc::new(NoExtract);
    let pipeline = Pipeline::new(
        PipelineConfig {
            voice_pool: Vec::new(),
            ..config()
        },
        Arc::new(NoSearch),
        extract.clone(),
        extract,
        generator,
        Arc::new(FixedTts),
        store.clone(),
    );

    let job = pipeline
        .run(JobRequest::new(InputSource::Text("material".to_string())))
        .await;
    match job.outcome {
        Some(JobOutcome::Failed { stage, error }) => {
            assert_eq!(stage, JobStage::AssigningVoices);
            assert!(matches!(error, PipelineError::InsufficientVoicePool));
        }
        other => panic!("expected voice pool failure, got {other:?}"),
    }
    assert_eq!(store.upload_count(), 0);
}

#[tokio::test]
async fn republishing_the_same_artifact_yields_fresh_valid_references() {
    let generator = Arc::new(ScriptedGenerator::new(vec![FOUR_TURNS, FOUR_TURNS]));
    let store = Arc::new(MemoryStore::new());
    let pipeline = pipeline_with(generator, store.clone());

    let text = "The same source text both times.".to_string();
    let first = pipeline
        .run(JobRequest::new(InputSource::Text(text.clone())))
        .await;
    let second = pipeline.run(JobRequest::new(InputSource::Text(text))).await;

    let (first, second) = match (first.outcome, second.outcome) {
        (Some(JobOutcome::Completed(a)), Some(JobOutcome::Completed(b))) => (a, b),
        other => panic!("expected two completions, got {other:?}"),
    };
    assert_ne!(first.refs.audio_url, second.refs.audio_url);
    assert_eq!(store.upload_count(), 6);
}
