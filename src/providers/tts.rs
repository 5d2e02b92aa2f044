use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::ProviderError;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one piece of text with one voice. Returns WAV bytes.
    /// Speed is in -2..=2, 0 is the provider's natural rate.
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        speed: i8,
    ) -> Result<Vec<u8>, ProviderError>;
}

pub struct SpeechClient {
    client: Client,
    base_url: String,
    api_key: String,
    sample_rate: u32,
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice: &'a str,
    speed: i8,
    sample_rate: u32,
    codec: &'a str,
    session_id: String,
}

#[derive(Deserialize)]
struct SynthesisResponse {
    #[serde(default)]
    audio: String,
    #[serde(default)]
    error: Option<SynthesisFault>,
}

#[derive(Deserialize)]
struct SynthesisFault {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl SpeechClient {
    pub fn new(base_url: &str, api_key: &str, sample_rate: u32, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            sample_rate,
        }
    }

    fn map_fault(fault: SynthesisFault) -> ProviderError {
        match fault.code.as_str() {
            "InvalidText" | "TextTooLong" => ProviderError::InvalidText(fault.message),
            "InvalidVoice" | "VoiceNotFound" => ProviderError::InvalidVoice(fault.message),
            _ => ProviderError::SynthesisUnavailable(format!("{}: {}", fault.code, fault.message)),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechClient {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        speed: i8,
    ) -> Result<Vec<u8>, ProviderError> {
        let body = SynthesisRequest {
            text,
            voice: voice_id,
            speed: speed.clamp(-2, 2),
            sample_rate: self.sample_rate,
            codec: "wav",
            session_id: Uuid::new_v4().to_string(),
        };

        let response = self
            .client
            .post(format!("{}/v1/synthesize", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::SynthesisUnavailable(e.to_string())
                }
            })?;

        let status = response.status();
        let parsed: SynthesisResponse = response.json().await.map_err(|e| {
            ProviderError::SynthesisUnavailable(format!("status {status}: {e}"))
        })?;

        if let Some(fault) = parsed.error {
            return Err(Self::map_fault(fault));
        }
        if !status.is_success() {
            return Err(ProviderError::SynthesisUnavailable(format!(
                "status {status}"
            )));
        }
        if parsed.audio.is_empty() {
            return Err(ProviderError::SynthesisUnavailable("empty audio".to_string()));
        }

        BASE64
            .decode(parsed.audio.as_bytes())
            .map_err(|e| ProviderError::SynthesisUnavailable(format!("malformed audio: {e}")))
    }
}
