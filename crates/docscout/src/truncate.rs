//! Boundary-aware truncation of text payloads
//!
//! Lengths are measured in characters, never bytes, so cuts always land on
//! a UTF-8 boundary.

/// Marker appended to every truncated payload
pub const TRUNCATION_MARKER: &str = "\n\n[..content truncated..]";

/// Fraction of the limit (as 4/5) a line boundary must reach to be used
const LINE_BOUNDARY_NUMERATOR: usize = 4;
const LINE_BOUNDARY_DENOMINATOR: usize = 5;

/// Truncate `content` to at most `max_length` characters plus the marker
///
/// Content already within budget is returned unchanged. When `smart` is set
/// the cut moves back to the nearest newline if that newline sits at or
/// beyond 80% of the limit. Re-truncating an already truncated payload with
/// the same limit is a no-op.
pub fn truncate(content: &str, max_length: usize, smart: bool) -> String {
    let length = content.chars().count();
    if length <= max_length {
        return content.to_string();
    }

    if let Some(kept) = content.strip_suffix(TRUNCATION_MARKER) {
        if kept.chars().count() <= max_length {
            return content.to_string();
        }
    }

    let hard_cut = byte_offset(content, max_length);
    let head = &content[..hard_cut];

    let cut = if smart {
        match head.rfind('\n') {
            Some(pos)
                if head[..pos].chars().count() * LINE_BOUNDARY_DENOMINATOR
                    >= max_length * LINE_BOUNDARY_NUMERATOR =>
            {
                pos
            }
            _ => hard_cut,
        }
    } else {
        hard_cut
    };

    let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
    truncated.push_str(&content[..cut]);
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Character count of the marker
pub fn marker_length() -> usize {
    TRUNCATION_MARKER.chars().count()
}

/// Byte offset of the `chars`-th character (or the end of the string)
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices()
        .nth(chars)
        .map(|(offset, _)| offset)
        .unwrap_or(s.len())
}
