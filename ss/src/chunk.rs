//! Transport chunking
//!
//! Packs text into fragments no longer than a fixed character limit, breaking
//! only at whitespace. Separators inside a fragment are kept as written, so
//! multi-line sections keep their layout; the separator at a break is dropped.

use tracing::debug;

/// Greedily pack `text` into fragments of at most `max_size` characters
///
/// Any whitespace character is a candidate break. A word that alone exceeds
/// `max_size` becomes its own oversized fragment. Empty input gives no
/// fragments, and whitespace-only fragments are never emitted.
pub fn chunk(text: &str, max_size: usize) -> Vec<String> {
    debug!(text_len = text.len(), max_size, "chunk: called");
    if text.is_empty() {
        return Vec::new();
    }

    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    let mut started = false;

    for (separator, word) in words(text) {
        let word_len = word.chars().count();
        if !started {
            current.push_str(word);
            current_len = word_len;
            started = true;
            continue;
        }

        if current_len + 1 + word_len <= max_size {
            current.extend(separator);
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            push_fragment(&mut fragments, std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    push_fragment(&mut fragments, current);

    debug!(fragment_count = fragments.len(), "chunk: done");
    fragments
}

/// Words with the whitespace character that precedes each (none for the first)
fn words(text: &str) -> Vec<(Option<char>, &str)> {
    let mut out = Vec::new();
    let mut separator = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            out.push((separator, &text[start..i]));
            separator = Some(c);
            start = i + c.len_utf8();
        }
    }
    out.push((separator, &text[start..]));
    out
}

fn push_fragment(fragments: &mut Vec<String>, fragment: String) {
    if !fragment.trim().is_empty() {
        fragments.push(fragment);
    }
}
