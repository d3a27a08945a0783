//! Snippet extraction
//!
//! Produces a short, context-padded excerpt of the flattened text around an
//! offset range, with the range itself wrapped in a `<mark>`. Used for
//! annotation previews and tooltips. Read-only: never mutates the tree.

use crate::anchor::{flatten_text, slice_chars};
use crate::html::tree::Node;

/// Default number of context characters on each side of the range.
pub const DEFAULT_CONTEXT: usize = 40;

/// Excerpt the flattened text around `[start, end)`.
///
/// Returns an empty string for a degenerate range. Offsets are clipped to
/// the text bounds; ellipses are added on whichever sides were truncated.
pub fn range_snippet(nodes: &[Node], start: usize, end: usize, context: usize) -> String {
    if start >= end {
        return String::new();
    }

    let text = flatten_text(nodes);
    let len = text.chars().count();
    let start = start.min(len);
    let end = end.min(len);
    if start >= end {
        return String::new();
    }

    let left = start.saturating_sub(context);
    let right = (end + context).min(len);

    let mut out = String::new();
    if left > 0 {
        out.push('…');
    }
    out.push_str(&html_escape::encode_text(&slice_chars(&text, left, start)));
    out.push_str("<mark>");
    out.push_str(&html_escape::encode_text(&slice_chars(&text, start, end)));
    out.push_str("</mark>");
    out.push_str(&html_escape::encode_text(&slice_chars(&text, end, right)));
    if right < len {
        out.push('…');
    }

    out.trim().to_string()
}
