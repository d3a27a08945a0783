//! Error types for the annotation engine
//!
//! Module-level errors are handled at their point of origin; this aggregate
//! exists for hosts that want one error type across the engine surface.
//! Stale offsets and malformed stored blobs are not errors at all: both
//! degrade silently (skip for the render pass, empty set on load).

use thiserror::Error;

use crate::html::{InjectError, ParseError, SanitizeError};
use crate::store::{PersistenceError, StoreError};
use crate::ui::{ComposeError, SelectionError};

/// Engine-wide result type
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine-wide error type
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Highlight injection error: {0}")]
    Inject(#[from] InjectError),

    #[error("Sanitization error: {0}")]
    Sanitize(#[from] SanitizeError),

    #[error("HTML parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
