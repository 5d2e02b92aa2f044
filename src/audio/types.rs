use serde::{Deserialize, Serialize};

use super::wav;

/// One row of the artifact's timeline: where each turn's speech sits in
/// the final mix. Consumed downstream by caption/slide generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub index: usize,
    pub speaker: String,
    pub start_ms: u64,
    pub duration_ms: u64,
}

/// The finished podcast: one continuous mono mix plus its metadata.
/// Created once per successful job and immutable thereafter.
#[derive(Debug, Clone)]
pub struct PodcastArtifact {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub duration_ms: u64,
    pub timeline: Vec<TimelineEntry>,
    pub music_track: Option<String>,
    pub transcript: String,
}

impl PodcastArtifact {
    /// Serialize the mix as a 16-bit mono WAV.
    pub fn wav_bytes(&self) -> Result<Vec<u8>, String> {
        wav::encode_wav(&self.samples, self.sample_rate)
    }
}

/// A decoded background music track, loaded by the driver so the
/// assembler itself never touches the filesystem.
#[derive(Debug, Clone)]
pub struct MusicBed {
    pub track_id: String,
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl MusicBed {
    pub fn from_wav_bytes(track_id: &str, bytes: &[u8]) -> Result<Self, String> {
        let (samples, sample_rate) = wav::decode_wav_mono(bytes)?;
        if samples.is_empty() {
            return Err("music track decoded to zero samples".to_string());
        }
        Ok(Self {
            track_id: track_id.to_string(),
            samples,
            sample_rate,
        })
    }
}
