use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use podforge::acquire::InputSource;
use podforge::pipeline::{JobOutcome, JobRequest, Pipeline};
use podforge::providers::{
    ExtractorClient, ScriptModelClient, SpeechClient, StorageClient, WebSearchClient,
};
use podforge::script::StyleDirectives;
use podforge::{PipelineConfig, ProviderSettings};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let request = parse_args().context("usage: podforge <topic|url|text|document> <payload> \
[--minutes N] [--tone TONE] [--language LANG] [--music TRACK] [--speed -2..2]")?;

    let config = PipelineConfig::from_env();
    let providers = ProviderSettings::from_env();
    let timeout = config.request_timeout();

    let extractor = Arc::new(ExtractorClient::new(&providers.extract_base_url, timeout));
    let pipeline = Pipeline::new(
        config,
        Arc::new(WebSearchClient::new(
            &providers.search_base_url,
            &providers.search_api_key,
            timeout,
        )),
        extractor.clone(),
        extractor,
        Arc::new(ScriptModelClient::new(
            &providers.llm_base_url,
            &providers.llm_api_key,
            &providers.llm_model,
            timeout,
        )),
        Arc::new(SpeechClient::new(
            &providers.tts_base_url,
            &providers.tts_api_key,
            providers.tts_sample_rate,
            timeout,
        )),
        Arc::new(StorageClient::new(
            &providers.storage_base_url,
            &providers.storage_bucket,
            &providers.storage_public_base,
            timeout,
        )),
    );

    let job = pipeline.run(request).await;
    match job.outcome {
        Some(JobOutcome::Completed(podcast)) => {
            println!("podcast ready ({} ms)", podcast.duration_ms);
            println!("  audio:      {}", podcast.refs.audio_url);
            println!("  transcript: {}", podcast.refs.transcript_url);
            println!("  timeline:   {}", podcast.refs.timeline_url);
            Ok(())
        }
        Some(JobOutcome::Failed { stage, error }) => {
            bail!("job failed at {}: {} ({:?})", stage.as_str(), error, error.class())
        }
        None => bail!("job ended without a terminal result"),
    }
}

fn parse_args() -> Result<JobRequest> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("missing input kind and payload");
    }
    let payload = args[1].clone();
    let input = match args[0].as_str() {
        "topic" => InputSource::Topic(payload),
        "url" => InputSource::Url(payload),
        "text" => InputSource::Text(payload),
        "document" => {
            let bytes =
                std::fs::read(&payload).with_context(|| format!("reading {payload}"))?;
            InputSource::Document {
                name: payload,
                bytes,
            }
        }
        other => bail!("unknown input kind: {other}"),
    };

    let mut request = JobRequest::new(input);
    let mut style = StyleDirectives::default();
    let mut flags = args[2..].iter();
    while let Some(flag) = flags.next() {
        let value = flags
            .next()
            .with_context(|| format!("{flag} needs a value"))?;
        match flag.as_str() {
            "--minutes" => style.target_minutes = Some(value.parse()?),
            "--tone" => style.tone = Some(value.clone()),
            "--language" => style.language = Some(value.clone()),
            "--music" => request.music_track = Some(value.clone()),
            "--speed" => request.speech_speed = value.parse()?,
            other => bail!("unknown flag: {other}"),
        }
    }
    request.style = style;
    Ok(request)
}
