/// Split an oversized document into bounded-length chunks, preferring
/// paragraph boundaries and hard-cutting only paragraphs that are
/// themselves over the limit. Limits are in chars, not bytes.
pub fn split_text(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let para_len = para.chars().count();
        if current_len + para_len > limit && current_len > 0 {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if para_len > limit {
            for piece in hard_cut(para, limit) {
                parts.push(piece);
            }
            continue;
        }
        if current_len > 0 {
            current.push_str("\n\n");
        }
        current.push_str(para);
        current_len += para_len;
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn hard_cut(text: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(limit)
        .map(|c| c.iter().collect::<String>())
        .collect()
}
