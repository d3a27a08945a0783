//! Annotation data model
//!
//! Position-addressed annotations over one specific rendering of an
//! article's content, plus the per-article set they are persisted in.

mod types;

pub use types::{Annotation, AnnotationSet};
