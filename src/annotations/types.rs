//! Annotation types
//!
//! An [`Annotation`] is one persisted highlight-with-comment over a character
//! range of an article's flattened rendered text. Offsets are only
//! meaningful against the exact rendering they were computed from; if the
//! source text, renderer, or render options change, stored offsets may no
//! longer resolve and are clipped or dropped at render time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted highlight with an attached comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Stable opaque identifier, generated client-side at creation.
    pub id: String,
    /// Start character offset into the flattened rendered text (inclusive).
    pub start: usize,
    /// End character offset (exclusive). Invariant: `start < end`.
    pub end: usize,
    /// Comment text, possibly empty. May itself contain markdown; it is
    /// rendered through the same rich-content renderer as article bodies.
    #[serde(default)]
    pub comment: String,
    /// Creation timestamp.
    #[serde(rename = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    #[serde(rename = "updatedAt", default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Annotation {
    /// Create a new annotation over `[start, end)` with a fresh UUID.
    ///
    /// Callers must have validated `start < end`; the store enforces it.
    pub fn new(start: usize, end: usize, comment: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            start,
            end,
            comment: comment.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the range survives clipping to a flattened text of `len`
    /// characters.
    pub fn resolves_within(&self, len: usize) -> bool {
        self.start.min(len) < self.end.min(len)
    }
}

/// The per-article annotation set: all annotations in insertion order plus
/// one free-text, non-positional note. Persisted wholesale as a single blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationSet {
    #[serde(rename = "noteContent", default)]
    pub note_content: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl AnnotationSet {
    /// Look up an annotation by id.
    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_annotation_gets_fresh_id() {
        let a = Annotation::new(4, 15, "nice description");
        let b = Annotation::new(4, 15, "nice description");
        assert_ne!(a.id, b.id);
        assert_eq!((a.start, a.end), (4, 15));
    }

    #[test]
    fn test_resolves_within() {
        let a = Annotation::new(10, 20, "");
        assert!(a.resolves_within(20));
        assert!(a.resolves_within(15));
        assert!(!a.resolves_within(10));
        assert!(!a.resolves_within(0));
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut set = AnnotationSet::default();
        set.note_content = "general note".to_string();
        set.annotations.push(Annotation::new(4, 15, "nice description"));

        let json = serde_json::to_string_pretty(&set).unwrap();
        assert!(json.contains("\"noteContent\""));
        assert!(json.contains("\"createdAt\""));

        let parsed: AnnotationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.annotations.len(), 1);
        assert_eq!(parsed.annotations[0].comment, "nice description");
    }

    #[test]
    fn test_deserialize_tolerates_missing_timestamps() {
        let json = r#"{"noteContent":"","annotations":[{"id":"x","start":1,"end":3,"comment":"c"}]}"#;
        let parsed: AnnotationSet = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.annotations[0].end, 3);
    }
}
