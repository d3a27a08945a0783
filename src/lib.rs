//! Marginalia
//!
//! Annotation anchoring and highlight overlay engine for rendered article
//! content. Readers select a span of rendered rich text, the engine records
//! the span as a position-addressed annotation, and later render passes
//! splice highlight markers back into freshly rendered HTML at the recorded
//! character ranges.
//!
//! # Modules
//!
//! - `html`: text-bearing tree over rendered HTML, highlight injection,
//!   snippet extraction, sanitization
//! - `anchor`: offset indexing between tree positions and flattened text
//! - `annotations`: the annotation data model
//! - `store`: the authoritative in-memory annotation set plus persistence
//! - `ui`: selection and hover controllers
//! - `render`: the rich-content renderer boundary

pub mod anchor;
pub mod annotations;
pub mod config;
pub mod error;
pub mod html;
pub mod render;
pub mod store;
pub mod ui;
