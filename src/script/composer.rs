use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::acquire::SourceDocument;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::providers::{ProviderError, ScriptGenerator};

use super::parser::parse_script;
use super::prompt::build_prompt;
use super::types::{ScriptTurn, StyleDirectives};

const RETRY_BACKOFF_MS: u64 = 500;

/// Sends acquired material to the script model and parses the response
/// into ordered turns. An unparsable response is retried with a stricter
/// format instruction; a provider outage is retried with backoff. The two
/// failure kinds stay distinct all the way to the job result.
pub struct ScriptComposer {
    generator: Arc<dyn ScriptGenerator>,
    config: PipelineConfig,
}

impl ScriptComposer {
    pub fn new(generator: Arc<dyn ScriptGenerator>, config: PipelineConfig) -> Self {
        Self { generator, config }
    }

    pub async fn compose(
        &self,
        topic: &str,
        documents: &[SourceDocument],
        style: &StyleDirectives,
    ) -> Result<Vec<ScriptTurn>, PipelineError> {
        let attempts = self.config.script_retry_limit + 1;
        let mut parse_failures = 0u32;
        let mut last_parse_reason = String::new();

        for attempt in 0..attempts {
            let prompt = build_prompt(topic, documents, style, &self.config, attempt > 0);
            let response = match self
                .generator
                .generate(
                    &prompt,
                    self.config.script_max_tokens,
                    self.config.script_temperature,
                )
                .await
            {
                Ok(response) => response,
                Err(e) if e.is_transient() && attempt + 1 < attempts => {
                    warn!(attempt, error = %e, "script generation unavailable, retrying");
                    sleep(Duration::from_millis(RETRY_BACKOFF_MS << attempt)).await;
                    continue;
                }
                Err(e) => return Err(map_generation_error(e)),
            };

            match parse_script(&response) {
                Some(turns) => {
                    info!(
                        turns = turns.len(),
                        speakers = distinct_speakers(&turns),
                        attempt,
                        "script composed"
                    );
                    return Ok(turns);
                }
                None => {
                    parse_failures += 1;
                    last_parse_reason = preview(&response);
                    warn!(attempt, "script response unparsable, regenerating");
                }
            }
        }

        Err(PipelineError::ScriptParse {
            reason: last_parse_reason,
            attempts: parse_failures,
        })
    }
}

fn distinct_speakers(turns: &[ScriptTurn]) -> usize {
    let mut seen: Vec<&str> = Vec::new();
    for turn in turns {
        if !seen.contains(&turn.speaker.as_str()) {
            seen.push(&turn.speaker);
        }
    }
    seen.len()
}

fn map_generation_error(e: ProviderError) -> PipelineError {
    PipelineError::GenerationUnavailable(e.to_string())
}

fn preview(response: &str) -> String {
    let head: String = response.chars().take(120).collect();
    if response.chars().count() > 120 {
        format!("{head}...")
    } else {
        head
    }
}
