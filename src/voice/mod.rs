use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PipelineError;
use crate::script::ScriptTurn;

/// A concrete provider voice: numeric id on the wire, display name for
/// logs and transcripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceIdentity {
    pub id: String,
    pub name: String,
}

impl VoiceIdentity {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Speaker label → voice, fixed for the lifetime of the job. Two labels
/// may share a voice (pool smaller than cast), but one label never
/// resolves to two voices.
#[derive(Debug, Clone)]
pub struct VoiceAssignment {
    by_label: HashMap<String, VoiceIdentity>,
    labels: Vec<String>,
}

impl VoiceAssignment {
    pub fn voice_for(&self, label: &str) -> Option<&VoiceIdentity> {
        self.by_label.get(label)
    }

    /// Labels in order of first appearance in the script.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The i-th distinct label, by first appearance, gets the i-th pool
/// voice, cycling when the cast outnumbers the pool. Deterministic given
/// the same turn sequence and pool.
pub fn assign_voices(
    turns: &[ScriptTurn],
    pool: &[VoiceIdentity],
) -> Result<VoiceAssignment, PipelineError> {
    if pool.is_empty() {
        return Err(PipelineError::InsufficientVoicePool);
    }
    let mut by_label = HashMap::new();
    let mut labels = Vec::new();
    for turn in turns {
        if !by_label.contains_key(&turn.speaker) {
            let voice = pool[labels.len() % pool.len()].clone();
            info!(speaker = %turn.speaker, voice = %voice.name, "voice assigned");
            by_label.insert(turn.speaker.clone(), voice);
            labels.push(turn.speaker.clone());
        }
    }
    Ok(VoiceAssignment { by_label, labels })
}
