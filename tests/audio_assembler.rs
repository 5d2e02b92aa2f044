use podforge::audio::{assemble, AssemblyParams, MusicBed};
use podforge::audio::wav::encode_wav;
use podforge::synth::AudioSegment;

const SAMPLE_RATE: u32 = 16_000;

fn segment(index: usize, speaker: &str, ms: u64) -> AudioSegment {
    AudioSegment {
        index,
        speaker: speaker.to_string(),
        text: format!("utterance {index}"),
        samples: vec![2000i16; (ms * SAMPLE_RATE as u64 / 1000) as usize],
        sample_rate: SAMPLE_RATE,
    }
}

fn params() -> AssemblyParams {
    AssemblyParams {
        pause_ms: 200,
        lead_in_ms: 100,
        music_gain_db: -14.0,
        music_fade_ms: 50,
    }
}

fn bed() -> MusicBed {
    // Half a second of quiet tone, long enough to force looping.
    let bytes = encode_wav(&vec![500i16; SAMPLE_RATE as usize / 2], SAMPLE_RATE).unwrap();
    MusicBed::from_wav_bytes("default", &bytes).unwrap()
}

fn four_segments() -> Vec<AudioSegment> {
    vec![
        segment(0, "ALEX", 400),
        segment(1, "JORDAN", 300),
        segment(2, "ALEX", 500),
        segment(3, "JORDAN", 250),
    ]
}

#[test]
fn duration_is_lead_in_plus_segments_plus_pauses() {
    let artifact = assemble(four_segments(), None, &params());
    // 100 lead-in + 1450 speech + 3 * 200 pauses
    assert_eq!(artifact.duration_ms, 100 + 1450 + 600);
}

#[test]
fn offsets_are_running_sums_of_prior_segments_and_pauses() {
    let artifact = assemble(four_segments(), None, &params());
    let starts: Vec<u64> = artifact.timeline.iter().map(|t| t.start_ms).collect();
    assert_eq!(starts, vec![100, 700, 1200, 1900]);
    let durations: Vec<u64> = artifact.timeline.iter().map(|t| t.duration_ms).collect();
    assert_eq!(durations, vec![400, 300, 500, 250]);
    let speakers: Vec<&str> = artifact.timeline.iter().map(|t| t.speaker.as_str()).collect();
    assert_eq!(speakers, vec!["ALEX", "JORDAN", "ALEX", "JORDAN"]);
}

#[test]
fn assembly_is_deterministic() {
    let bed = bed();
    let first = assemble(four_segments(), Some(&bed), &params());
    let second = assemble(four_segments(), Some(&bed), &params());

    assert_eq!(first.samples, second.samples);
    assert_eq!(first.timeline, second.timeline);
    assert_eq!(first.duration_ms, second.duration_ms);
}

#[test]
fn music_bed_never_changes_duration_or_offsets() {
    let dry = assemble(four_segments(), None, &params());
    let bed = bed();
    let wet = assemble(four_segments(), Some(&bed), &params());

    assert_eq!(dry.duration_ms, wet.duration_ms);
    assert_eq!(dry.timeline, wet.timeline);
    assert_eq!(wet.music_track.as_deref(), Some("default"));
    assert_eq!(dry.music_track, None);
}

#[test]
fn music_is_audible_in_pauses_but_attenuated() {
    let bed = bed();
    let wet = assemble(four_segments(), Some(&bed), &params());
    // Sample the middle of the first inter-turn pause: only music there.
    let pause_mid = (650 * SAMPLE_RATE as u64 / 1000) as usize;
    let value = wet.samples[pause_mid].unsigned_abs();
    assert!(value > 0, "pause should carry the music bed");
    assert!(value < 500, "bed must be attenuated below its raw level");
}

#[test]
fn transcript_lists_every_turn_in_order() {
    let artifact = assemble(four_segments(), None, &params());
    let lines: Vec<&str> = artifact.transcript.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("ALEX: "));
    assert!(lines[3].starts_with("JORDAN: "));
}

#[test]
fn single_segment_has_no_pause() {
    let artifact = assemble(vec![segment(0, "ALEX", 400)], None, &params());
    assert_eq!(artifact.duration_ms, 500);
    assert_eq!(artifact.timeline[0].start_ms, 100);
}

#[test]
fn wav_serialization_round_trips() {
    let artifact = assemble(four_segments(), None, &params());
    let bytes = artifact.wav_bytes().unwrap();
    let (decoded, rate) = podforge::audio::wav::decode_wav_mono(&bytes).unwrap();
    assert_eq!(rate, SAMPLE_RATE);
    assert_eq!(decoded, artifact.samples);
}
