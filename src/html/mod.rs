//! HTML processing module
//!
//! Provides HTML manipulation for rendered article content including:
//! - An explicit text-bearing tree over rendered HTML
//! - Highlight marker injection at character ranges
//! - Context-padded snippet extraction
//! - HTML sanitization
//!
//! The tree is parsed with quick-xml and addressed by child-index paths, so
//! the anchoring algorithms work against any rendering of the content rather
//! than a live browser DOM.

mod injector;
mod sanitize;
mod snippet;
mod tree;

pub use injector::{apply_annotations, HighlightConfig, InjectError, InjectionResult};
pub use sanitize::{sanitize_html, SanitizeError};
pub use snippet::{range_snippet, DEFAULT_CONTEXT};
pub use tree::{node_at, parse_html, splice_at, to_html, Element, Node, NodePath, ParseError};
