use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the caller handed us. The payload shape depends on the kind, so
/// the pair is a tagged enum rather than a (kind, payload) tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InputSource {
    Topic(String),
    Url(String),
    Document { name: String, bytes: Vec<u8> },
    Text(String),
}

impl InputSource {
    pub fn kind(&self) -> &'static str {
        match self {
            InputSource::Topic(_) => "topic",
            InputSource::Url(_) => "url",
            InputSource::Document { .. } => "document",
            InputSource::Text(_) => "text",
        }
    }

    /// Short topic line for the script prompt. Topics and URLs speak for
    /// themselves; documents and raw text get a content preview.
    pub fn topic_line(&self) -> String {
        match self {
            InputSource::Topic(t) => t.clone(),
            InputSource::Url(u) => u.clone(),
            InputSource::Document { name, .. } => name.clone(),
            InputSource::Text(t) => preview(t, 50),
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let cleaned: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() <= max_chars {
        return cleaned;
    }
    let head: String = cleaned.chars().take(max_chars).collect();
    format!("{head}...")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceOrigin {
    SearchResult,
    FetchedUrl,
    UploadedFile,
}

/// One unit of acquired raw text. Immutable once created; a job holds
/// these in acquisition/relevance order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub origin: SourceOrigin,
    pub title: String,
    pub url: Option<String>,
    pub text: String,
    /// Extraction confidence in [0, 1], a length-based heuristic.
    pub confidence: f32,
    /// Primary material is quoted at length in the prompt; supplementary
    /// material only fills gaps.
    pub primary: bool,
    pub fetched_at: DateTime<Utc>,
}

impl SourceDocument {
    pub fn new(origin: SourceOrigin, title: &str, url: Option<&str>, text: String) -> Self {
        let confidence = content_confidence(&text);
        Self {
            origin,
            title: title.to_string(),
            url: url.map(|u| u.to_string()),
            text,
            confidence,
            primary: true,
            fetched_at: Utc::now(),
        }
    }

    pub fn supplementary(mut self) -> Self {
        self.primary = false;
        self
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Longer extractions are more likely to be real article bodies than
/// boilerplate; saturates at 2000 chars.
fn content_confidence(text: &str) -> f32 {
    let len = text.chars().count() as f32;
    (len / 2000.0).min(1.0)
}
