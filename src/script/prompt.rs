use crate::acquire::SourceDocument;
use crate::config::PipelineConfig;

use super::types::StyleDirectives;

/// Appended when a previous response failed to parse.
pub const STRICT_FORMAT_REMINDER: &str = "\n\nIMPORTANT: your previous response \
could not be parsed. Output ONLY dialogue lines in the exact form \
`SPEAKER: utterance`, one per line. No markdown, no headings, no numbering, \
no commentary before or after the dialogue.";

/// Build the single prompt context: numbered evidence blocks, primary
/// sources quoted at length and first, supplementary sources only as
/// short gap-fillers, style directives woven in.
pub fn build_prompt(
    topic: &str,
    documents: &[SourceDocument],
    style: &StyleDirectives,
    config: &PipelineConfig,
    strict: bool,
) -> String {
    let primary: Vec<&SourceDocument> = documents.iter().filter(|d| d.primary).collect();
    let supplementary: Vec<&SourceDocument> = documents.iter().filter(|d| !d.primary).collect();

    let mut evidence = String::new();
    for (i, doc) in primary.iter().enumerate() {
        evidence.push_str(&format!(
            "[{}] Title: {}\n{}Content: {}\n\n",
            i + 1,
            doc.title,
            source_line(doc),
            cap_chars(&doc.text, config.primary_snippet_cap),
        ));
    }
    if !supplementary.is_empty() {
        evidence.push_str("Supplementary material (gap-filling only):\n\n");
        for (i, doc) in supplementary.iter().enumerate() {
            evidence.push_str(&format!(
                "[S{}] Title: {}\n{}Content: {}\n\n",
                i + 1,
                doc.title,
                source_line(doc),
                cap_chars(&doc.text, config.supplementary_snippet_cap),
            ));
        }
    }

    let minutes = style.target_minutes.unwrap_or(10).max(1);
    let words = minutes * config.words_per_minute;
    let language = style.language.as_deref().unwrap_or("English");
    let tone = style.tone.as_deref().unwrap_or("engaging and conversational");

    let mut prompt = format!(
        "Write a two-host podcast dialogue about: {topic}\n\n\
Language: {language}. Tone: {tone}.\n\
Target length: about {minutes} minutes of speech (roughly {words} words).\n\n\
The hosts:\n\
- ALEX, the expert: knowledgeable, analytical, explains terms when they come up.\n\
- JORDAN, the guide: curious, asks the questions a listener would, summarizes \
key points and keeps the conversation moving.\n\n\
Ground every key fact in the evidence below and cite it inline as [n]. Primary \
sources [1], [2], ... are the backbone; each must be drawn on at least once. \
Supplementary sources [S1], [S2], ... only fill gaps. Where the evidence is \
thin, say so rather than inventing facts.\n\n\
Evidence:\n\n{evidence}\
Output format, strictly: one turn per line, `SPEAKER: utterance`, speakers \
alternating naturally. A turn may open with a short parenthetical stage \
direction, e.g. `JORDAN: (laughs) ...`. No markdown, no headings, no text \
outside the dialogue. Open with a welcome and close with a sign-off."
    );
    if strict {
        prompt.push_str(STRICT_FORMAT_REMINDER);
    }
    prompt
}

fn source_line(doc: &SourceDocument) -> String {
    match &doc.url {
        Some(url) => format!("Source: {url}\n"),
        None => String::new(),
    }
}

fn cap_chars(text: &str, cap: usize) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();
    if cleaned.chars().count() <= cap {
        cleaned
    } else {
        cleaned.chars().take(cap).collect()
    }
}
