use regex::Regex;
use std::sync::OnceLock;

fn citation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\[S?\d+\]\s*").expect("citation regex"))
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+|\S+@\S+\.\S+").expect("url regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

/// Scrub script text so the synthesizer accepts it: citation markers,
/// URLs and e-mail addresses, control characters, collapsed whitespace.
/// `aggressive` additionally drops everything outside letters, digits,
/// and common punctuation — the second chance after an InvalidText
/// rejection.
pub fn sanitize_for_tts(text: &str, aggressive: bool) -> String {
    let t = citation_re().replace_all(text, " ");
    let t = url_re().replace_all(&t, " ");
    let t: String = t.chars().filter(|c| !c.is_control()).collect();
    let mut t = whitespace_re().replace_all(&t, " ").trim().to_string();
    if aggressive {
        t = t
            .chars()
            .filter(|c| {
                c.is_alphanumeric() || matches!(c, ' ' | '.' | ',' | '!' | '?' | ';' | ':' | '\'' | '-')
            })
            .collect();
        t = whitespace_re().replace_all(&t, " ").trim().to_string();
    }
    t
}

/// Split text over the synthesizer's per-request limit: sentence
/// boundaries first, then clause boundaries, hard character cuts as the
/// last resort. Limits are in chars.
pub fn split_for_tts(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.trim().is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= limit {
        return vec![text.trim().to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    for sentence in split_keeping(text, |c| matches!(c, '.' | '!' | '?' | '\u{3002}' | '\u{ff01}' | '\u{ff1f}')) {
        let sentence_len = sentence.chars().count();
        let current_len = current.chars().count();
        if current_len + sentence_len > limit && current_len > 0 {
            parts.push(std::mem::take(&mut current).trim().to_string());
        }
        if sentence_len > limit {
            split_clauses(&sentence, limit, &mut parts);
        } else {
            current.push_str(&sentence);
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts.retain(|p| !p.is_empty());
    parts
}

fn split_clauses(sentence: &str, limit: usize, parts: &mut Vec<String>) {
    let mut current = String::new();
    for clause in split_keeping(sentence, |c| matches!(c, ',' | ';' | '\u{ff0c}' | '\u{3001}' | '\u{ff1b}')) {
        let clause_len = clause.chars().count();
        let current_len = current.chars().count();
        if current_len + clause_len > limit && current_len > 0 {
            parts.push(std::mem::take(&mut current).trim().to_string());
        }
        if clause_len > limit {
            let chars: Vec<char> = clause.chars().collect();
            for piece in chars.chunks(limit) {
                parts.push(piece.iter().collect::<String>().trim().to_string());
            }
        } else {
            current.push_str(&clause);
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
}

/// Split after each matching delimiter, keeping the delimiter attached to
/// the preceding piece.
fn split_keeping(text: &str, is_delim: impl Fn(char) -> bool) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if is_delim(c) {
            pieces.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
