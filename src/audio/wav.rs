use std::io::Cursor;

/// Encode mono i16 PCM as a WAV container.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, String> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut bytes = Vec::new();
    {
        let mut writer =
            hound::WavWriter::new(Cursor::new(&mut bytes), spec).map_err(|e| e.to_string())?;
        for &sample in samples {
            writer.write_sample(sample).map_err(|e| e.to_string())?;
        }
        writer.finalize().map_err(|e| e.to_string())?;
    }
    Ok(bytes)
}

/// Decode a WAV to mono i16, averaging down multi-channel input.
pub fn decode_wav_mono(bytes: &[u8]) -> Result<(Vec<i16>, u32), String> {
    crate::synth::segment::decode_wav(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_pcm() {
        let samples: Vec<i16> = (0..1600).map(|i| (i % 32) as i16 * 100).collect();
        let bytes = encode_wav(&samples, 16_000).unwrap();
        let (decoded, rate) = decode_wav_mono(&bytes).unwrap();
        assert_eq!(rate, 16_000);
        assert_eq!(decoded, samples);
    }
}
