//! Rich-content renderer boundary
//!
//! The engine treats rendering as a pure collaborator: `render(source,
//! options) -> html`. Annotation offsets are valid only against one specific
//! `(source, options)` pair's output, so hosts must render with identical
//! options when re-displaying annotated content. Comments pass through the
//! same renderer before display.

use pulldown_cmark::{html, Options, Parser};

/// Rendering options. Part of the offset addressing space: changing any of
/// these invalidates previously stored offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    /// Replaces quotes/dashes with typographic variants. Off by default
    /// because it changes the flattened text.
    pub smart_punctuation: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            smart_punctuation: false,
        }
    }
}

/// Pure source-to-HTML rendering.
pub trait ContentRenderer: Send + Sync {
    fn render(&self, source: &str, options: &RenderOptions) -> String;
}

/// Markdown renderer backed by pulldown-cmark.
#[derive(Debug, Default)]
pub struct MarkdownRenderer;

impl ContentRenderer for MarkdownRenderer {
    fn render(&self, source: &str, options: &RenderOptions) -> String {
        let mut flags = Options::empty();
        if options.tables {
            flags.insert(Options::ENABLE_TABLES);
        }
        if options.footnotes {
            flags.insert(Options::ENABLE_FOOTNOTES);
        }
        if options.strikethrough {
            flags.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if options.smart_punctuation {
            flags.insert(Options::ENABLE_SMART_PUNCTUATION);
        }

        let parser = Parser::new_ext(source, flags);
        let mut out = String::new();
        html::push_html(&mut out, parser);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer;
        let html = renderer.render("The **quick** brown fox", &RenderOptions::default());
        assert_eq!(html.trim(), "<p>The <strong>quick</strong> brown fox</p>");
    }

    #[test]
    fn test_render_output_parses_into_tree() {
        let renderer = MarkdownRenderer;
        let html = renderer.render(
            "A line with *emphasis*  \nand a break\n\n![alt](img.png)",
            &RenderOptions::default(),
        );
        let nodes = crate::html::parse_html(&html).unwrap();
        let text = crate::anchor::flatten_text(&nodes);
        assert!(text.contains("A line with emphasis"));
    }

    #[test]
    fn test_smart_punctuation_changes_flattened_text() {
        let renderer = MarkdownRenderer;
        let plain = renderer.render("\"hi\"", &RenderOptions::default());
        let smart = renderer.render(
            "\"hi\"",
            &RenderOptions {
                smart_punctuation: true,
                ..RenderOptions::default()
            },
        );
        assert_ne!(plain, smart);
    }
}
