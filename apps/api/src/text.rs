//! Small text helpers shared by the prompt builders.

/// Cuts `text` to at most `max_chars` characters, appending `suffix` when
/// anything was removed. Counts characters, not bytes, so multi-byte input
/// never splits inside a code point.
pub fn truncate_chars(text: &str, max_chars: usize, suffix: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], suffix),
        None => text.to_string(),
    }
}

/// Key used wherever titles are compared for duplicates.
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}
