use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{FailureClass, PipelineError};
use crate::providers::{ProviderError, SpeechSynthesizer};
use crate::script::ScriptTurn;
use crate::voice::VoiceAssignment;

use super::gather::scatter_ordered;
use super::sanitize::{sanitize_for_tts, split_for_tts};
use super::segment::{decode_wav, AudioSegment};

/// Drives concurrent per-turn synthesis. In-flight requests are bounded
/// by `synth_concurrency`; the stage's output is always in turn order no
/// matter what order the provider answers in. One turn exhausting its
/// retries fails the whole stage — partial podcasts are never surfaced.
pub struct SynthesisCoordinator {
    tts: Arc<dyn SpeechSynthesizer>,
    config: PipelineConfig,
}

impl SynthesisCoordinator {
    pub fn new(tts: Arc<dyn SpeechSynthesizer>, config: PipelineConfig) -> Self {
        Self { tts, config }
    }

    pub async fn synthesize_all(
        &self,
        turns: &[ScriptTurn],
        assignment: &VoiceAssignment,
        speed: i8,
    ) -> Result<Vec<AudioSegment>, PipelineError> {
        info!(
            turns = turns.len(),
            concurrency = self.config.synth_concurrency,
            "synthesis started"
        );
        let slots = scatter_ordered(turns.len(), self.config.synth_concurrency, |index| {
            let turn = turns[index].clone();
            let voice_id = assignment
                .voice_for(&turn.speaker)
                .map(|v| v.id.clone());
            let tts = self.tts.clone();
            let config = self.config.clone();
            async move { synthesize_turn(tts, &config, turn, voice_id, speed).await }
        })
        .await;

        let mut segments = Vec::with_capacity(slots.len());
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(segment)) => segments.push(segment),
                Some(Err(e)) => {
                    return Err(PipelineError::SynthesisFailed {
                        turn: index,
                        reason: e.to_string(),
                        class: if e.is_transient() {
                            FailureClass::Transient
                        } else {
                            FailureClass::Permanent
                        },
                    })
                }
                None => {
                    return Err(PipelineError::SynthesisFailed {
                        turn: index,
                        reason: "synthesis task aborted".to_string(),
                        class: FailureClass::Transient,
                    })
                }
            }
        }
        info!(
            segments = segments.len(),
            total_ms = segments.iter().map(AudioSegment::duration_ms).sum::<u64>(),
            "synthesis complete"
        );
        Ok(segments)
    }
}

/// Synthesize one turn: scrub the text, split it under the provider's
/// per-request limit, render the chunks sequentially, splice the decoded
/// PCM back into a single segment.
async fn synthesize_turn(
    tts: Arc<dyn SpeechSynthesizer>,
    config: &PipelineConfig,
    turn: ScriptTurn,
    voice_id: Option<String>,
    speed: i8,
) -> Result<AudioSegment, ProviderError> {
    let voice_id =
        voice_id.ok_or_else(|| ProviderError::InvalidVoice(format!("no voice for speaker {}", turn.speaker)))?;

    let clean = sanitize_for_tts(&turn.text, false);
    let chunks = split_for_tts(&clean, config.tts_text_limit);
    if chunks.is_empty() {
        return Err(ProviderError::InvalidText(format!(
            "turn {} empty after sanitization",
            turn.index
        )));
    }

    let mut samples: Vec<i16> = Vec::new();
    let mut sample_rate = 0u32;
    for chunk in chunks {
        let audio = synthesize_chunk(&*tts, config, &chunk, &voice_id, speed, turn.index).await?;
        let (mut pcm, rate) = decode_wav(&audio)
            .map_err(|e| ProviderError::SynthesisUnavailable(format!("undecodable audio: {e}")))?;
        if sample_rate == 0 {
            sample_rate = rate;
        } else if rate != sample_rate {
            return Err(ProviderError::SynthesisUnavailable(format!(
                "sample rate changed mid-turn: {sample_rate} then {rate}"
            )));
        }
        samples.append(&mut pcm);
    }
    debug!(turn = turn.index, samples = samples.len(), "turn rendered");
    Ok(AudioSegment {
        index: turn.index,
        speaker: turn.speaker,
        text: turn.text,
        samples,
        sample_rate,
    })
}

/// One chunk against the provider, with the retry policy: transient
/// failures get `synth_retry_limit` more attempts with doubling backoff,
/// an InvalidText rejection earns exactly one aggressive re-scrub, and
/// everything else is terminal immediately.
async fn synthesize_chunk(
    tts: &dyn SpeechSynthesizer,
    config: &PipelineConfig,
    chunk: &str,
    voice_id: &str,
    speed: i8,
    turn_index: usize,
) -> Result<Vec<u8>, ProviderError> {
    let mut text = chunk.to_string();
    let mut rescrubbed = false;
    let mut attempt = 0u32;
    loop {
        match tts.synthesize(&text, voice_id, speed).await {
            Ok(audio) => return Ok(audio),
            Err(e) if e.is_transient() && attempt < config.synth_retry_limit => {
                let backoff = config.synth_backoff_ms << attempt;
                warn!(turn = turn_index, attempt, error = %e, backoff_ms = backoff, "transient synthesis failure");
                sleep(Duration::from_millis(backoff)).await;
                attempt += 1;
            }
            Err(ProviderError::InvalidText(reason)) if !rescrubbed => {
                warn!(turn = turn_index, %reason, "text rejected, re-scrubbing aggressively");
                text = sanitize_for_tts(&text, true);
                if text.is_empty() {
                    return Err(ProviderError::InvalidText(reason));
                }
                rescrubbed = true;
            }
            Err(e) => return Err(e),
        }
    }
}
