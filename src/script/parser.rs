use super::types::ScriptTurn;

/// Parse the model's response into turns. One turn per line in the form
/// `SPEAKER: utterance`; lines that do not fit (headings, blank lines,
/// stray commentary) are dropped. Returns `None` when not a single
/// well-formed turn survives — the caller treats that as a parse failure,
/// not a provider failure.
///
/// Indices are assigned densely here; whatever numbering the model may
/// have emitted is discarded.
pub fn parse_script(response: &str) -> Option<Vec<ScriptTurn>> {
    let mut turns = Vec::new();
    for line in response.lines() {
        if let Some((speaker, text, direction)) = parse_line(line) {
            turns.push(ScriptTurn {
                index: turns.len(),
                speaker,
                text,
                direction,
            });
        }
    }
    if turns.is_empty() {
        None
    } else {
        Some(turns)
    }
}

fn parse_line(line: &str) -> Option<(String, String, Option<String>)> {
    let line = strip_markdown(line.trim());
    if line.is_empty() {
        return None;
    }
    // Accept both ASCII and fullwidth colons after the label.
    let (label, rest) = line
        .split_once(':')
        .or_else(|| line.split_once('\u{ff1a}'))?;

    let speaker = label.trim().trim_matches('*').trim();
    // Speaker labels are short names, not clock times or URLs.
    if speaker.is_empty()
        || speaker.chars().count() > 40
        || speaker.chars().any(|c| c.is_ascii_digit())
    {
        return None;
    }

    let (direction, text) = split_direction(rest.trim());
    if text.is_empty() {
        return None;
    }
    Some((speaker.to_string(), text, direction))
}

/// A leading parenthetical is a stage direction, not speech.
fn split_direction(text: &str) -> (Option<String>, String) {
    for (open, close) in [('(', ')'), ('\u{ff08}', '\u{ff09}')] {
        if let Some(rest) = text.strip_prefix(open) {
            if let Some(end) = rest.find(close) {
                let direction = rest[..end].trim().to_string();
                let spoken = rest[end + close.len_utf8()..].trim().to_string();
                if !direction.is_empty() && !spoken.is_empty() {
                    return (Some(direction), spoken);
                }
            }
        }
    }
    (None, text.to_string())
}

/// Shed list bullets, heading markers, and bold markers the model sneaks
/// in despite the format instruction.
fn strip_markdown(line: &str) -> &str {
    line.trim_start_matches(['#', '-', '*', '>', ' '])
        .trim_end_matches("**")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_turns() {
        let turns = parse_script("ALEX: Welcome back.\nJORDAN: Glad to be here.").unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker, "ALEX");
        assert_eq!(turns[1].text, "Glad to be here.");
    }

    #[test]
    fn indices_are_dense_even_with_noise_lines() {
        let raw = "# Podcast Script\n\nALEX: First.\n\n(transition)\nJORDAN: Second.\nALEX: Third.";
        let turns = parse_script(raw).unwrap();
        let indices: Vec<usize> = turns.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn extracts_leading_stage_direction() {
        let turns = parse_script("JORDAN: (laughs) That can't be right.").unwrap();
        assert_eq!(turns[0].direction.as_deref(), Some("laughs"));
        assert_eq!(turns[0].text, "That can't be right.");
    }

    #[test]
    fn strips_bold_speaker_labels() {
        let turns = parse_script("**ALEX**: Bold label.").unwrap();
        assert_eq!(turns[0].speaker, "ALEX");
    }

    #[test]
    fn rejects_clock_times_as_speakers() {
        assert!(parse_script("12:30 intro music").is_none());
    }

    #[test]
    fn unparsable_response_is_none() {
        assert!(parse_script("Sorry, I cannot write that script.").is_none());
        assert!(parse_script("").is_none());
    }
}
