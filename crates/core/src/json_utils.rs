//! Text helpers shared across crates: fenced-JSON stripping and char-safe truncation.

/// Strip markdown code block wrappers from model output.
///
/// Handles `` ```json ... ``` ``, `` ``` ... ``` `` and other language identifiers.
#[must_use]
pub fn strip_markdown_json(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.len() >= 6 && trimmed.starts_with("```") && trimmed.ends_with("```") {
        let inner = trimmed.get(3..trimmed.len() - 3).unwrap_or(trimmed);
        return inner.split_once('\n').map_or_else(|| inner.trim(), |(_, rest)| rest.trim());
    }
    trimmed
}

/// Truncate to at most `max_chars` characters (not bytes).
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s.get(..idx).unwrap_or(s),
        None => s,
    }
}

/// Preview for a button label: `max_chars` characters followed by `…` when cut.
#[must_use]
pub fn preview(s: &str, max_chars: usize) -> String {
    let cut = truncate_chars(s, max_chars);
    if cut.len() < s.len() { format!("{cut}…") } else { cut.to_owned() }
}
