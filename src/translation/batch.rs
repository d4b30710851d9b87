/*!
 * Entry-marker batching for LLM backends.
 *
 * Several texts travel in one prompt, each preceded by `<<ENTRY_n>>` and the
 * whole batch closed by `<<END>>`. Responses are split back on the same
 * markers; a response missing any marker is rejected so the caller can fall
 * back to one request per text.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::ops::Range;

use crate::errors::ProviderError;

/// Closing marker of a batch
pub const END_MARKER: &str = "<<END>>";

static ENTRY_MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<<ENTRY_(\d+)>>|<<END>>").unwrap());

/// Opening marker of entry `index`
pub fn entry_marker(index: usize) -> String {
    format!("<<ENTRY_{}>>", index)
}

/// Split `texts` into consecutive ranges whose total length stays under
/// `max_chars`. A text longer than the limit gets a range of its own.
pub fn chunk_by_chars(texts: &[String], max_chars: usize) -> Vec<Range<usize>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut size = 0;

    for (index, text) in texts.iter().enumerate() {
        let len = text.chars().count();
        if index > start && size + len > max_chars {
            chunks.push(start..index);
            start = index;
            size = 0;
        }
        size += len;
    }
    if start < texts.len() {
        chunks.push(start..texts.len());
    }
    chunks
}

/// Render entries with their markers, numbered from zero
pub fn format_entries(texts: &[String]) -> String {
    let mut combined = String::new();
    for (index, text) in texts.iter().enumerate() {
        combined.push_str(&entry_marker(index));
        combined.push('\n');
        combined.push_str(text);
        combined.push('\n');
    }
    combined.push_str(END_MARKER);
    combined
}

/// Split a marked response back into `expected` entries, in marker order.
///
/// Text after the last entry marker runs to `<<END>>` or the end of the
/// response. Entry bodies lose the newline framing added by
/// [`format_entries`] and surrounding whitespace.
pub fn parse_entries(response: &str, expected: usize) -> Result<Vec<String>, ProviderError> {
    let mut found: HashMap<usize, String> = HashMap::new();
    let markers: Vec<_> = ENTRY_MARKER_REGEX.captures_iter(response).collect();

    for (position, captures) in markers.iter().enumerate() {
        let Some(index) = captures.get(1).and_then(|m| m.as_str().parse::<usize>().ok()) else {
            continue;
        };
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let body_end = markers
            .get(position + 1)
            .and_then(|next| next.get(0))
            .map(|next| next.start())
            .unwrap_or(response.len());
        let body = response[whole.end()..body_end].trim();
        found.entry(index).or_insert_with(|| body.to_string());
    }

    (0..expected)
        .map(|index| {
            found.remove(&index).ok_or_else(|| {
                ProviderError::ParseError(format!(
                    "Missing {} in batch response of {} entries",
                    entry_marker(index),
                    expected
                ))
            })
        })
        .collect()
}
