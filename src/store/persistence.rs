//! Persistence boundary
//!
//! The external persistence API stores one opaque blob per article and
//! replaces it wholesale on save: idempotent, all-or-nothing, no
//! partial-field update and no version token. Implementations only move the
//! blob; parsing and defaulting live in the store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// Persistence failures surfaced to the user as a transient notice.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Persistence request failed: {0}")]
    Transport(String),

    #[error("Persistence service returned {status}: {message}")]
    Service { status: u16, message: String },
}

/// Wholesale blob load/save for one article's annotation set.
#[async_trait]
pub trait AnnotationPersistence: Send + Sync {
    /// Fetch the stored blob, or `None` when nothing has been stored yet.
    async fn load_blob(&self, article_id: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace the stored blob with `blob`.
    async fn save_blob(&self, article_id: &str, blob: &str) -> Result<(), PersistenceError>;
}

/// In-memory persistence, used in tests and the demo binary.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    blobs: Mutex<HashMap<String, String>>,
}

impl InMemoryPersistence {
    /// Pre-seed a stored blob for an article.
    pub fn seeded(article_id: &str, blob: &str) -> Self {
        let store = Self::default();
        store
            .blobs
            .lock()
            .expect("persistence lock poisoned")
            .insert(article_id.to_string(), blob.to_string());
        store
    }
}

#[async_trait]
impl AnnotationPersistence for InMemoryPersistence {
    async fn load_blob(&self, article_id: &str) -> Result<Option<String>, PersistenceError> {
        let blobs = self.blobs.lock().expect("persistence lock poisoned");
        Ok(blobs.get(article_id).cloned())
    }

    async fn save_blob(&self, article_id: &str, blob: &str) -> Result<(), PersistenceError> {
        let mut blobs = self.blobs.lock().expect("persistence lock poisoned");
        blobs.insert(article_id.to_string(), blob.to_string());
        Ok(())
    }
}
