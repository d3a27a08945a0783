//! Annotation store
//!
//! The authoritative in-memory [`AnnotationSet`] for the currently displayed
//! article, and the single choke point for persistence. The set is replaced
//! wholesale when the displayed article changes and saved wholesale after
//! every mutation; there is no per-field patch operation.
//!
//! Mutations are optimistic: `save()` failures surface to the caller but the
//! in-memory state is never rolled back, so a retry re-issues the save with
//! the already-mutated state. Two rapid mutations issue two independent
//! saves with no ordering guarantee; arrival order determines the persisted
//! result.

mod http;
mod persistence;

pub use http::HttpPersistence;
pub use persistence::{AnnotationPersistence, InMemoryPersistence, PersistenceError};

use std::sync::Arc;

use thiserror::Error;

use crate::annotations::{Annotation, AnnotationSet};

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid annotation range {start}..{end}")]
    InvalidRange { start: usize, end: usize },

    #[error("Annotation '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Parse a persisted annotation blob, tolerating absent or malformed JSON.
///
/// Failing to show old highlights is preferable to blocking the page, so a
/// blob that does not parse degrades to the empty set with a warning.
pub fn parse_blob(article_id: &str, blob: Option<&str>) -> AnnotationSet {
    let Some(blob) = blob else {
        return AnnotationSet::default();
    };
    match serde_json::from_str(blob) {
        Ok(set) => set,
        Err(e) => {
            tracing::warn!(
                article_id = %article_id,
                error = %e,
                "Stored annotation blob failed to parse, starting with empty set"
            );
            AnnotationSet::default()
        }
    }
}

/// In-memory annotation set for one article, backed by a persistence API.
pub struct AnnotationStore {
    article_id: String,
    set: AnnotationSet,
    persistence: Arc<dyn AnnotationPersistence>,
}

impl AnnotationStore {
    pub fn new(article_id: &str, persistence: Arc<dyn AnnotationPersistence>) -> Self {
        Self {
            article_id: article_id.to_string(),
            set: AnnotationSet::default(),
            persistence,
        }
    }

    /// The article this store currently owns annotations for.
    pub fn article_id(&self) -> &str {
        &self.article_id
    }

    /// Replace the in-memory set with the persisted one for the current
    /// article. Called once per article view.
    pub async fn load(&mut self) -> Result<(), PersistenceError> {
        let blob = self.persistence.load_blob(&self.article_id).await?;
        self.set = parse_blob(&self.article_id, blob.as_deref());
        tracing::debug!(
            article_id = %self.article_id,
            count = self.set.annotations.len(),
            "Loaded annotation set"
        );
        Ok(())
    }

    /// Switch to a different article, replacing the set wholesale.
    pub async fn switch_article(&mut self, article_id: &str) -> Result<(), PersistenceError> {
        self.article_id = article_id.to_string();
        self.set = AnnotationSet::default();
        self.load().await
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.set.annotations
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.set.get(id)
    }

    pub fn note_content(&self) -> &str {
        &self.set.note_content
    }

    /// Replace the free-text note. Callers follow with `save()`.
    pub fn set_note_content(&mut self, note: &str) {
        self.set.note_content = note.to_string();
    }

    /// Append a new annotation over `[start, end)` with a fresh id.
    pub fn add(&mut self, start: usize, end: usize, comment: &str) -> Result<&Annotation, StoreError> {
        if start >= end {
            return Err(StoreError::InvalidRange { start, end });
        }
        let annotation = Annotation::new(start, end, comment);
        tracing::debug!(annotation_id = %annotation.id, start, end, "Adding annotation");
        self.set.annotations.push(annotation);
        Ok(self.set.annotations.last().expect("just pushed"))
    }

    /// Replace the comment of an existing annotation. Offsets are immutable
    /// after creation.
    pub fn update(&mut self, id: &str, comment: &str) -> Result<(), StoreError> {
        let annotation = self
            .set
            .annotations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        annotation.comment = comment.to_string();
        annotation.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Remove the annotation with the given id. No-op when absent.
    pub fn remove(&mut self, id: &str) {
        self.set.annotations.retain(|a| a.id != id);
    }

    /// Persist the entire current set, replacing any stored value.
    pub async fn save(&self) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(&self.set)
            .map_err(|e| PersistenceError::Transport(e.to_string()))?;
        self.persistence.save_blob(&self.article_id, &blob).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn memory_store(article_id: &str) -> AnnotationStore {
        AnnotationStore::new(article_id, Arc::new(InMemoryPersistence::default()))
    }

    #[tokio::test]
    async fn test_load_absent_blob_defaults_to_empty() {
        let mut store = memory_store("article-1");
        store.load().await.unwrap();
        assert!(store.annotations().is_empty());
        assert_eq!(store.note_content(), "");
    }

    #[tokio::test]
    async fn test_load_malformed_blob_defaults_to_empty() {
        let persistence = Arc::new(InMemoryPersistence::default());
        persistence
            .save_blob("article-1", "{not json at all")
            .await
            .unwrap();

        let mut store = AnnotationStore::new("article-1", persistence);
        store.load().await.unwrap();
        assert!(store.annotations().is_empty());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let persistence = Arc::new(InMemoryPersistence::default());
        let mut store = AnnotationStore::new("article-1", persistence.clone());
        store.add(4, 15, "nice description").unwrap();
        store.set_note_content("general note");
        store.save().await.unwrap();

        let mut reloaded = AnnotationStore::new("article-1", persistence);
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.annotations().len(), 1);
        assert_eq!(reloaded.annotations()[0].comment, "nice description");
        assert_eq!(reloaded.note_content(), "general note");
    }

    #[tokio::test]
    async fn test_switch_article_replaces_set() {
        let persistence = Arc::new(InMemoryPersistence::default());
        let mut store = AnnotationStore::new("article-1", persistence.clone());
        store.add(0, 3, "first").unwrap();
        store.save().await.unwrap();

        store.switch_article("article-2").await.unwrap();
        assert!(store.annotations().is_empty());

        store.switch_article("article-1").await.unwrap();
        assert_eq!(store.annotations().len(), 1);
    }

    #[test]
    fn test_add_rejects_degenerate_range() {
        let mut store = memory_store("article-1");
        assert!(matches!(
            store.add(5, 5, "x"),
            Err(StoreError::InvalidRange { start: 5, end: 5 })
        ));
        assert!(matches!(store.add(7, 3, "x"), Err(StoreError::InvalidRange { .. })));
    }

    #[test]
    fn test_update_missing_id_errors() {
        let mut store = memory_store("article-1");
        assert!(matches!(
            store.update("missing", "x"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_replaces_comment_only() {
        let mut store = memory_store("article-1");
        let id = store.add(1, 4, "old").unwrap().id.clone();
        store.update(&id, "new").unwrap();

        let annotation = store.get(&id).unwrap();
        assert_eq!(annotation.comment, "new");
        assert_eq!((annotation.start, annotation.end), (1, 4));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = memory_store("article-1");
        let id = store.add(1, 4, "x").unwrap().id.clone();
        store.remove(&id);
        assert!(store.annotations().is_empty());
        // Removing again is a no-op, not an error.
        store.remove(&id);
        store.remove("never-existed");
        assert!(store.annotations().is_empty());
    }

    /// Persistence that fails every save, for rollback-policy tests.
    #[derive(Default)]
    struct FailingPersistence;

    #[async_trait]
    impl AnnotationPersistence for FailingPersistence {
        async fn load_blob(&self, _article_id: &str) -> Result<Option<String>, PersistenceError> {
            Ok(None)
        }

        async fn save_blob(&self, _article_id: &str, _blob: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Transport("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_save_failure_leaves_state_intact() {
        let mut store = AnnotationStore::new("article-1", Arc::new(FailingPersistence::default()));
        let id = store.add(4, 15, "nice description").unwrap().id.clone();

        let err = store.save().await.unwrap_err();
        assert!(matches!(err, PersistenceError::Transport(_)));

        // No rollback: the added annotation is still visible and a retry
        // re-issues the same state.
        assert_eq!(store.annotations().len(), 1);
        assert_eq!(store.get(&id).unwrap().comment, "nice description");
        assert!(store.save().await.is_err());
        assert_eq!(store.annotations().len(), 1);
    }
}
