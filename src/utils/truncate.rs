/// Longest failure description carried into logs and error messages.
pub const MAX_LOG_CHARS: usize = 512;

/// Cuts `text` to [`MAX_LOG_CHARS`] characters without splitting a UTF-8 sequence.
#[must_use]
pub fn truncate_for_log(text: &str) -> String {
    truncate_chars(text, MAX_LOG_CHARS)
}

#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}…", &text[..byte_idx]),
        None => text.to_string(),
    }
}
