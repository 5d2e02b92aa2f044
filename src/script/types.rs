use serde::{Deserialize, Serialize};

/// One utterance in the dialogue. Indices are dense `0..N-1` after
/// parsing; the turn sequence, in index order, is the full script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptTurn {
    pub index: usize,
    pub speaker: String,
    pub text: String,
    /// Leading parenthetical from the model, e.g. "(pause)" or "(laughs)".
    pub direction: Option<String>,
}

/// Caller style hints. Target duration is advisory: it becomes a word
/// count hint in the prompt and is never enforced by truncation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleDirectives {
    pub language: Option<String>,
    pub target_minutes: Option<u32>,
    pub tone: Option<String>,
}
