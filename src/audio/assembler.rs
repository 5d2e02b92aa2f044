use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::synth::AudioSegment;

use super::types::{MusicBed, PodcastArtifact, TimelineEntry};

const FALLBACK_SAMPLE_RATE: u32 = 16_000;

/// Mix-time tunables, detached from the full config so the assembler can
/// be exercised with nothing else around.
#[derive(Debug, Clone)]
pub struct AssemblyParams {
    pub pause_ms: u32,
    pub lead_in_ms: u32,
    pub music_gain_db: f32,
    pub music_fade_ms: u32,
}

impl From<&PipelineConfig> for AssemblyParams {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            pause_ms: config.pause_ms,
            lead_in_ms: config.lead_in_ms,
            music_gain_db: config.music_gain_db,
            music_fade_ms: config.music_fade_ms,
        }
    }
}

/// Concatenate ordered segments with inter-turn pauses, record the offset
/// table, and sum a looped, attenuated music bed under the whole mix.
/// Pure over its inputs: same segments, same parameters, same bed yield
/// an identical artifact.
pub fn assemble(
    segments: Vec<AudioSegment>,
    bed: Option<&MusicBed>,
    params: &AssemblyParams,
) -> PodcastArtifact {
    let sample_rate = segments
        .iter()
        .map(|s| s.sample_rate)
        .find(|&r| r > 0)
        .unwrap_or(FALLBACK_SAMPLE_RATE);
    let pause_samples = ms_to_samples(params.pause_ms as u64, sample_rate);
    let lead_in_samples = ms_to_samples(params.lead_in_ms as u64, sample_rate);

    let total_samples: usize = lead_in_samples
        + segments.iter().map(|s| s.samples.len()).sum::<usize>()
        + pause_samples * segments.len().saturating_sub(1);
    let mut mix: Vec<i16> = Vec::with_capacity(total_samples);
    mix.resize(lead_in_samples, 0);

    let mut timeline = Vec::with_capacity(segments.len());
    let mut transcript = String::new();
    let last = segments.len().saturating_sub(1);
    for (i, segment) in segments.into_iter().enumerate() {
        timeline.push(TimelineEntry {
            index: segment.index,
            speaker: segment.speaker.clone(),
            start_ms: samples_to_ms(mix.len(), sample_rate),
            duration_ms: segment.duration_ms(),
        });
        transcript_line(&mut transcript, &segment);
        mix.extend_from_slice(&segment.samples);
        if i < last {
            mix.resize(mix.len() + pause_samples, 0);
        }
    }

    let music_track = bed.map(|b| b.track_id.clone());
    if let Some(bed) = bed {
        mix_music(&mut mix, bed, sample_rate, params);
    }

    let duration_ms = samples_to_ms(mix.len(), sample_rate);
    info!(
        duration_ms,
        turns = timeline.len(),
        music = music_track.as_deref().unwrap_or("none"),
        "podcast assembled"
    );
    PodcastArtifact {
        samples: mix,
        sample_rate,
        duration_ms,
        timeline,
        music_track,
        transcript,
    }
}

/// Loop/trim the bed under the full mix at a fixed attenuation, with a
/// short fade at both ends, summing with saturation. Never changes the
/// mix length.
fn mix_music(mix: &mut [i16], bed: &MusicBed, sample_rate: u32, params: &AssemblyParams) {
    if bed.samples.is_empty() || bed.sample_rate == 0 {
        warn!(track = %bed.track_id, "music bed unusable, skipping");
        return;
    }
    let gain = 10f32.powf(params.music_gain_db / 20.0);
    let fade_samples = ms_to_samples(params.music_fade_ms as u64, sample_rate).max(1);
    let total = mix.len();

    for (i, out) in mix.iter_mut().enumerate() {
        // Nearest-neighbor resample of the looped bed to the mix rate.
        let bed_pos =
            (i as u64 * bed.sample_rate as u64 / sample_rate as u64) as usize % bed.samples.len();
        let fade = fade_factor(i, total, fade_samples);
        let music = (bed.samples[bed_pos] as f32 * gain * fade) as i32;
        *out = (*out as i32 + music).clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }
}

fn fade_factor(position: usize, total: usize, fade_samples: usize) -> f32 {
    if position < fade_samples {
        position as f32 / fade_samples as f32
    } else if position + fade_samples >= total {
        (total - position) as f32 / fade_samples as f32
    } else {
        1.0
    }
}

fn transcript_line(transcript: &mut String, segment: &AudioSegment) {
    transcript.push_str(&segment.speaker);
    transcript.push_str(": ");
    transcript.push_str(&segment.text);
    transcript.push('\n');
}

fn ms_to_samples(ms: u64, sample_rate: u32) -> usize {
    (ms * sample_rate as u64 / 1000) as usize
}

fn samples_to_ms(samples: usize, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    samples as u64 * 1000 / sample_rate as u64
}
