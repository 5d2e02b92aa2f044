use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::voice::VoiceIdentity;

/// Read-only pipeline configuration, established at process start.
/// Constructed explicitly and passed into the driver so tests can run
/// several configurations in one process.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    // Acquisition
    pub search_count: usize,
    pub max_extra_queries: usize,
    pub min_corpus_chars: usize,
    pub min_extract_chars: usize,
    pub min_snippet_chars: usize,
    pub supplementary_results: usize,
    pub context_budget_chars: usize,
    pub min_doc_chars: usize,

    // Script generation
    pub primary_snippet_cap: usize,
    pub supplementary_snippet_cap: usize,
    pub script_max_tokens: u32,
    pub script_temperature: f32,
    pub script_retry_limit: u32,
    pub words_per_minute: u32,

    // Voices & synthesis
    pub voice_pool: Vec<VoiceIdentity>,
    pub speech_speed: i8,
    pub tts_text_limit: usize,
    pub synth_concurrency: usize,
    pub synth_retry_limit: u32,
    pub synth_backoff_ms: u64,

    // Assembly
    pub pause_ms: u32,
    pub lead_in_ms: u32,
    pub music_gain_db: f32,
    pub music_fade_ms: u32,
    pub music_tracks: HashMap<String, PathBuf>,
    pub default_music_track: String,

    // Publishing / transport
    pub upload_retry_limit: u32,
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut music_tracks = HashMap::new();
        music_tracks.insert("serious".to_string(), PathBuf::from("assets/bgm/serious.wav"));
        music_tracks.insert("history".to_string(), PathBuf::from("assets/bgm/history.wav"));
        music_tracks.insert(
            "entertainment".to_string(),
            PathBuf::from("assets/bgm/entertainment.wav"),
        );
        music_tracks.insert("default".to_string(), PathBuf::from("assets/bgm/default.wav"));

        Self {
            search_count: 8,
            max_extra_queries: 2,
            min_corpus_chars: 2000,
            min_extract_chars: 200,
            min_snippet_chars: 80,
            supplementary_results: 4,
            context_budget_chars: 60_000,
            min_doc_chars: 10_000,

            primary_snippet_cap: 30_000,
            supplementary_snippet_cap: 1000,
            script_max_tokens: 4096,
            script_temperature: 0.7,
            script_retry_limit: 2,
            words_per_minute: 160,

            voice_pool: vec![
                VoiceIdentity::new("501006", "Aiden"),
                VoiceIdentity::new("601007", "Mora"),
            ],
            speech_speed: 0,
            tts_text_limit: 220,
            synth_concurrency: 4,
            synth_retry_limit: 3,
            synth_backoff_ms: 500,

            pause_ms: 200,
            lead_in_ms: 100,
            music_gain_db: -14.0,
            music_fade_ms: 400,
            music_tracks,
            default_music_track: "default".to_string(),

            upload_retry_limit: 2,
            request_timeout_secs: 30,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by PODFORGE_* environment variables, the same
    /// precedence the deployment scripts rely on.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.search_count = env_parse("PODFORGE_SEARCH_COUNT", cfg.search_count);
        cfg.max_extra_queries = env_parse("PODFORGE_MAX_EXTRA_QUERIES", cfg.max_extra_queries);
        cfg.min_corpus_chars = env_parse("PODFORGE_MIN_CORPUS_CHARS", cfg.min_corpus_chars);
        cfg.supplementary_results =
            env_parse("PODFORGE_SUPPLEMENTARY_RESULTS", cfg.supplementary_results);
        cfg.context_budget_chars =
            env_parse("PODFORGE_CONTEXT_BUDGET_CHARS", cfg.context_budget_chars);
        cfg.script_max_tokens = env_parse("PODFORGE_SCRIPT_MAX_TOKENS", cfg.script_max_tokens);
        cfg.script_temperature = env_parse("PODFORGE_SCRIPT_TEMPERATURE", cfg.script_temperature);
        cfg.script_retry_limit = env_parse("PODFORGE_SCRIPT_RETRY_LIMIT", cfg.script_retry_limit);
        cfg.speech_speed = env_parse("PODFORGE_SPEECH_SPEED", cfg.speech_speed).clamp(-2, 2);
        cfg.synth_concurrency = env_parse("PODFORGE_SYNTH_CONCURRENCY", cfg.synth_concurrency).max(1);
        cfg.synth_retry_limit = env_parse("PODFORGE_SYNTH_RETRY_LIMIT", cfg.synth_retry_limit);
        cfg.synth_backoff_ms = env_parse("PODFORGE_SYNTH_BACKOFF_MS", cfg.synth_backoff_ms);
        cfg.pause_ms = env_parse("PODFORGE_PAUSE_MS", cfg.pause_ms);
        cfg.music_gain_db = env_parse("PODFORGE_MUSIC_GAIN_DB", cfg.music_gain_db);
        cfg.request_timeout_secs = env_parse("PODFORGE_REQUEST_TIMEOUT_SECS", cfg.request_timeout_secs);

        if let Ok(raw) = std::env::var("PODFORGE_VOICES") {
            let pool = parse_voice_pool(&raw);
            if !pool.is_empty() {
                cfg.voice_pool = pool;
            }
        }
        if let Ok(dir) = std::env::var("PODFORGE_BGM_DIR") {
            for path in cfg.music_tracks.values_mut() {
                if let Some(name) = path.file_name().map(|n| n.to_os_string()) {
                    *path = PathBuf::from(&dir).join(name);
                }
            }
        }
        cfg
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Comma-separated `id:name` pairs, e.g. "501006:Aiden,601007:Mora".
/// A bare id is accepted and doubles as the display name.
fn parse_voice_pool(raw: &str) -> Vec<VoiceIdentity> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            match entry.split_once(':') {
                Some((id, name)) if !id.trim().is_empty() => {
                    Some(VoiceIdentity::new(id.trim(), name.trim()))
                }
                _ => Some(VoiceIdentity::new(entry, entry)),
            }
        })
        .collect()
}

fn env_parse<T: FromStr + Copy>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

/// Connection settings for the external providers; separate from the
/// pipeline tunables so tests never need them.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub search_base_url: String,
    pub search_api_key: String,
    pub extract_base_url: String,
    pub llm_base_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub tts_base_url: String,
    pub tts_api_key: String,
    pub tts_sample_rate: u32,
    pub storage_base_url: String,
    pub storage_bucket: String,
    pub storage_public_base: String,
}

impl ProviderSettings {
    pub fn from_env() -> Self {
        Self {
            search_base_url: env_string("PODFORGE_SEARCH_URL", "http://localhost:8091"),
            search_api_key: env_string("PODFORGE_SEARCH_API_KEY", ""),
            extract_base_url: env_string("PODFORGE_EXTRACT_URL", "http://localhost:8092"),
            llm_base_url: env_string("PODFORGE_LLM_URL", "http://localhost:8080"),
            llm_api_key: env_string("PODFORGE_LLM_API_KEY", ""),
            llm_model: env_string("PODFORGE_LLM_MODEL", "scriptwriter-large"),
            tts_base_url: env_string("PODFORGE_TTS_URL", "http://localhost:8093"),
            tts_api_key: env_string("PODFORGE_TTS_API_KEY", ""),
            tts_sample_rate: env_parse("PODFORGE_TTS_SAMPLE_RATE", 16_000),
            storage_base_url: env_string("PODFORGE_STORAGE_URL", "http://localhost:9000"),
            storage_bucket: env_string("PODFORGE_STORAGE_BUCKET", "podforge-artifacts"),
            storage_public_base: env_string(
                "PODFORGE_STORAGE_PUBLIC_BASE",
                "http://localhost:9000/podforge-artifacts",
            ),
        }
    }
}

fn env_string(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}
