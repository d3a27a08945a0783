//! Text offset indexing
//!
//! Bidirectional mapping between "a point inside the rendered-content tree"
//! and "an integer offset into the tree's flattened text". Every annotation
//! offset in the engine is an index into this flattened text, so the walk
//! here is the single authority for what an offset means.
//!
//! Offsets count Unicode scalar values, not bytes. The walk is a pure
//! function of the tree's current structure and must be rebuilt whenever the
//! tree changes.

use serde::{Deserialize, Serialize};

use crate::html::{Node, NodePath};

/// One text-bearing leaf in document order, with its cumulative character
/// range within the flattened text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Child-index path to the text node.
    pub path: NodePath,
    /// Cumulative start offset (inclusive).
    pub start: usize,
    /// Cumulative end offset (exclusive).
    pub end: usize,
}

/// A point inside the tree: a text node plus a character offset local to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreePoint {
    pub path: NodePath,
    pub offset: usize,
}

/// A selection range between two tree points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRange {
    pub start: TreePoint,
    pub end: TreePoint,
}

impl TreeRange {
    /// Whether the range's endpoints coincide.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The ordered walk of all text-bearing leaves under a fragment.
#[derive(Debug, Clone)]
pub struct TextWalk {
    entries: Vec<WalkEntry>,
    len: usize,
}

impl TextWalk {
    /// Visit all text leaves under the fragment in document order and record
    /// their cumulative character ranges.
    pub fn build(nodes: &[Node]) -> Self {
        let mut entries = Vec::new();
        let mut cursor = 0usize;
        let mut path = Vec::new();
        collect(nodes, &mut path, &mut cursor, &mut entries);
        Self {
            entries,
            len: cursor,
        }
    }

    /// The walk entries, in document order.
    pub fn entries(&self) -> &[WalkEntry] {
        &self.entries
    }

    /// Total character length of the flattened text.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Convert a selection range into `(start, end)` offsets into the
    /// flattened text.
    ///
    /// Returns `None` when either endpoint does not land inside a
    /// text-bearing leaf of this walk (an image, an element node, a node
    /// outside the content root). A collapsed selection maps to
    /// `start == end`; callers must reject zero-length results before
    /// treating the selection as an annotation target.
    pub fn range_to_offsets(&self, range: &TreeRange) -> Option<(usize, usize)> {
        let start = self.point_to_offset(&range.start)?;
        let end = self.point_to_offset(&range.end)?;
        Some((start.min(end), start.max(end)))
    }

    fn point_to_offset(&self, point: &TreePoint) -> Option<usize> {
        let entry = self.entries.iter().find(|e| e.path == point.path)?;
        let node_len = entry.end - entry.start;
        Some(entry.start + point.offset.min(node_len))
    }
}

fn collect(nodes: &[Node], path: &mut NodePath, cursor: &mut usize, entries: &mut Vec<WalkEntry>) {
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        match node {
            Node::Text(text) => {
                let chars = text.chars().count();
                entries.push(WalkEntry {
                    path: path.clone(),
                    start: *cursor,
                    end: *cursor + chars,
                });
                *cursor += chars;
            }
            Node::Element(element) => {
                collect(&element.children, path, cursor, entries);
            }
        }
        path.pop();
    }
}

/// Concatenate all text leaves under the fragment in document order.
pub fn flatten_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    flatten_into(nodes, &mut out);
    out
}

fn flatten_into(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => flatten_into(&element.children, out),
        }
    }
}

/// Slice a string by character offsets, clipping both bounds to the text.
pub fn slice_chars(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end.saturating_sub(start)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    #[test]
    fn test_walk_cumulative_offsets() {
        let nodes = parse_html("<p>The <em>quick</em> fox</p>").unwrap();
        let walk = TextWalk::build(&nodes);

        let entries = walk.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!((entries[0].start, entries[0].end), (0, 4));
        assert_eq!((entries[1].start, entries[1].end), (4, 9));
        assert_eq!((entries[2].start, entries[2].end), (9, 13));
        assert_eq!(walk.len(), 13);
    }

    #[test]
    fn test_walk_skips_text_free_nodes() {
        let nodes = parse_html("<p>a</p><img src=\"x.png\" /><p>b</p>").unwrap();
        let walk = TextWalk::build(&nodes);
        assert_eq!(walk.entries().len(), 2);
        assert_eq!(flatten_text(&nodes), "ab");
    }

    #[test]
    fn test_range_to_offsets_round_trip() {
        let nodes = parse_html("<p>The <em>quick</em> brown fox</p>").unwrap();
        let walk = TextWalk::build(&nodes);
        let text = flatten_text(&nodes);

        // "quick" inside the <em>, through " brown" in the tail text node.
        let range = TreeRange {
            start: TreePoint {
                path: vec![0, 1, 0],
                offset: 0,
            },
            end: TreePoint {
                path: vec![0, 2],
                offset: 6,
            },
        };
        let (start, end) = walk.range_to_offsets(&range).unwrap();
        assert_eq!(slice_chars(&text, start, end), "quick brown");
        assert_eq!(end - start, "quick brown".chars().count());
    }

    #[test]
    fn test_range_to_offsets_rejects_non_text_endpoint() {
        let nodes = parse_html("<p>a<img src=\"x.png\" />b</p>").unwrap();
        let walk = TextWalk::build(&nodes);

        // Endpoint on the image element, not a text leaf.
        let range = TreeRange {
            start: TreePoint {
                path: vec![0, 0],
                offset: 0,
            },
            end: TreePoint {
                path: vec![0, 1],
                offset: 0,
            },
        };
        assert!(walk.range_to_offsets(&range).is_none());
    }

    #[test]
    fn test_collapsed_range_maps_to_zero_length() {
        let nodes = parse_html("<p>abc</p>").unwrap();
        let walk = TextWalk::build(&nodes);

        let point = TreePoint {
            path: vec![0, 0],
            offset: 1,
        };
        let range = TreeRange {
            start: point.clone(),
            end: point,
        };
        assert!(range.is_collapsed());
        assert_eq!(walk.range_to_offsets(&range), Some((1, 1)));
    }

    #[test]
    fn test_local_offset_clamped_to_node_length() {
        let nodes = parse_html("<p>ab</p>").unwrap();
        let walk = TextWalk::build(&nodes);

        let range = TreeRange {
            start: TreePoint {
                path: vec![0, 0],
                offset: 0,
            },
            end: TreePoint {
                path: vec![0, 0],
                offset: 99,
            },
        };
        assert_eq!(walk.range_to_offsets(&range), Some((0, 2)));
    }

    #[test]
    fn test_offsets_count_scalar_values() {
        let nodes = parse_html("<p>héllo wörld</p>").unwrap();
        let walk = TextWalk::build(&nodes);
        assert_eq!(walk.len(), 11);
        assert_eq!(slice_chars(&flatten_text(&nodes), 6, 11), "wörld");
    }
}
