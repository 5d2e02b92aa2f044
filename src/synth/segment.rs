use std::io::Cursor;

/// Rendered speech for exactly one script turn: decoded mono PCM, ready
/// for the assembler. Decoding happens at synthesis time so the assembler
/// stays a pure transformation.
#[derive(Debug, Clone)]
pub struct AudioSegment {
    pub index: usize,
    pub speaker: String,
    pub text: String,
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioSegment {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }
}

/// Decode provider WAV bytes to mono i16. Multi-channel input is averaged
/// down; float and 8/24/32-bit int formats are rescaled.
pub fn decode_wav(bytes: &[u8]) -> Result<(Vec<i16>, u32), String> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let shift = spec.bits_per_sample.saturating_sub(16);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v >> shift).clamp(i16::MIN as i32, i16::MAX as i32) as i16))
                .collect::<Result<_, _>>()
                .map_err(|e| e.to_string())?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<Result<_, _>>()
            .map_err(|e| e.to_string())?,
    };

    let mono = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| (frame.iter().map(|&s| s as i32).sum::<i32>() / channels as i32) as i16)
            .collect()
    };
    Ok((mono, spec.sample_rate))
}
