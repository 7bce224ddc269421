//! Fixed-width character chunking.
//!
//! Extracted text is cut into consecutive windows of at most `max_chars` characters. Chunks
//! never overlap and never split a UTF-8 sequence; concatenating them in order yields the input
//! exactly. Only the last chunk may be shorter than `max_chars`.

/// Default number of characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 3000;

/// Split `text` into ordered chunks of at most `max_chars` characters.
///
/// Empty input yields no chunks. A `max_chars` of zero is treated as one.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::with_capacity(text.len() / max_chars + 1);
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(text[start..offset].to_string());
            start = offset;
            count = 0;
        }
        count += 1;
    }
    chunks.push(text[start..].to_string());

    chunks
}
