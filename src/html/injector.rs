//! Highlight injection at character ranges
//!
//! Splices highlight marker elements into already-rendered HTML so each
//! annotation's `[start, end)` span is wrapped in a marker carrying the
//! annotation id. The input HTML is parsed into an isolated tree (never the
//! displayed one), the text walk is captured once before any split, and each
//! affected text node is rebuilt as before / highlighted / after parts.
//!
//! Guarantee: stripping every marker from the output and reinserting its text
//! content in place reproduces the input's flattened text exactly. Stale
//! annotations whose offsets fall outside the current text are skipped for
//! the pass, never raised.

use thiserror::Error;

use crate::anchor::{slice_chars, TextWalk};
use crate::annotations::Annotation;
use crate::html::tree::{node_at, parse_html, splice_at, to_html, Element, Node, ParseError};

/// Configuration for highlight injection
#[derive(Debug, Clone)]
pub struct HighlightConfig {
    /// Marker element tag.
    pub tag: String,
    /// CSS class set on every marker.
    pub class: String,
    /// Data attribute carrying the annotation id.
    pub id_attribute: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            tag: "mark".to_string(),
            class: "annotation-highlight".to_string(),
            id_attribute: "data-annotation-id".to_string(),
        }
    }
}

/// Result of highlight injection
#[derive(Debug)]
pub struct InjectionResult {
    /// The processed HTML with highlight markers spliced in.
    pub html: String,
    /// Number of annotations applied to at least one text node.
    pub injected_count: usize,
    /// Ids of annotations skipped as stale for this render pass.
    pub skipped: Vec<String>,
}

/// Errors during highlight injection
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("Failed to parse rendered HTML: {0}")]
    Parse(#[from] ParseError),
}

/// One slice of a text node's content, optionally owned by a marker.
struct Segment {
    text: String,
    owner: Option<String>,
}

/// Wrap each annotation's span in a highlight marker element.
///
/// Annotations are applied in ascending `start` order against the walk
/// captured before any split. Within one text node a later annotation wraps
/// only the slices not already inside a marker, so overlapping ranges never
/// merge, nest, or lose text.
pub fn apply_annotations(
    html: &str,
    annotations: &[Annotation],
    config: &HighlightConfig,
) -> Result<InjectionResult, InjectError> {
    if annotations.is_empty() {
        return Ok(InjectionResult {
            html: html.to_string(),
            injected_count: 0,
            skipped: vec![],
        });
    }

    let mut nodes = parse_html(html)?;
    let walk = TextWalk::build(&nodes);
    let len = walk.len();

    let mut sorted: Vec<&Annotation> = annotations.iter().collect();
    sorted.sort_by_key(|a| a.start);

    let mut injected_count = 0;
    let mut skipped = Vec::new();
    // Per walk entry: the node-local cuts to apply, in application order.
    let mut cuts: Vec<Vec<(String, usize, usize)>> = vec![Vec::new(); walk.entries().len()];

    for annotation in sorted {
        if !annotation.resolves_within(len) {
            tracing::warn!(
                annotation_id = %annotation.id,
                start = annotation.start,
                end = annotation.end,
                text_len = len,
                "Annotation offsets fall outside current content, skipping for this render pass"
            );
            skipped.push(annotation.id.clone());
            continue;
        }
        let start = annotation.start.min(len);
        let end = annotation.end.min(len);

        for (index, entry) in walk.entries().iter().enumerate() {
            if entry.end <= start || entry.start >= end {
                continue;
            }
            let lo = start.max(entry.start) - entry.start;
            let hi = end.min(entry.end) - entry.start;
            cuts[index].push((annotation.id.clone(), lo, hi));
        }
        injected_count += 1;
    }

    // Splice in reverse document order so walk paths stay valid while
    // sibling counts change.
    for (index, entry) in walk.entries().iter().enumerate().rev() {
        if cuts[index].is_empty() {
            continue;
        }
        let Some(text) = node_at(&nodes, &entry.path).and_then(Node::as_text) else {
            continue;
        };
        let segments = split_segments(text, &cuts[index]);
        let replacement = segments
            .into_iter()
            .map(|segment| match segment.owner {
                Some(id) => marker_node(&segment.text, &id, config),
                None => Node::Text(segment.text),
            })
            .collect();
        splice_at(&mut nodes, &entry.path, replacement);
    }

    Ok(InjectionResult {
        html: to_html(&nodes),
        injected_count,
        skipped,
    })
}

/// Cut a text node's content into plain and marker-owned segments.
fn split_segments(text: &str, cuts: &[(String, usize, usize)]) -> Vec<Segment> {
    let mut segments = vec![Segment {
        text: text.to_string(),
        owner: None,
    }];

    for (id, lo, hi) in cuts {
        let mut next = Vec::with_capacity(segments.len() + 2);
        let mut position = 0usize;
        for segment in segments {
            let seg_len = segment.text.chars().count();
            let seg_start = position;
            let seg_end = position + seg_len;
            position = seg_end;

            // Already-marked slices are left to their first owner.
            if segment.owner.is_some() || seg_end <= *lo || seg_start >= *hi {
                next.push(segment);
                continue;
            }

            let cut_lo = (*lo).max(seg_start) - seg_start;
            let cut_hi = (*hi).min(seg_end) - seg_start;
            let before = slice_chars(&segment.text, 0, cut_lo);
            let marked = slice_chars(&segment.text, cut_lo, cut_hi);
            let after = slice_chars(&segment.text, cut_hi, seg_len);

            if !before.is_empty() {
                next.push(Segment {
                    text: before,
                    owner: None,
                });
            }
            next.push(Segment {
                text: marked,
                owner: Some(id.clone()),
            });
            if !after.is_empty() {
                next.push(Segment {
                    text: after,
                    owner: None,
                });
            }
        }
        segments = next;
    }

    segments
}

fn marker_node(text: &str, annotation_id: &str, config: &HighlightConfig) -> Node {
    Node::Element(Element {
        tag: config.tag.clone(),
        attrs: vec![
            ("class".to_string(), config.class.clone()),
            (config.id_attribute.clone(), annotation_id.to_string()),
        ],
        children: vec![Node::Text(text.to_string())],
    })
}
