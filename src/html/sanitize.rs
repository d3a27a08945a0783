//! HTML sanitization
//!
//! Every piece of HTML the engine hands back to a host page must pass
//! through here before insertion into the live document. The annotation
//! engine itself is not a trust boundary; this strips active content from
//! renderer output and injected markup alike.
//!
//! Uses lol_html for streaming rewriting.

use lol_html::{element, rewrite_str, RewriteStrSettings};
use thiserror::Error;

/// Errors during sanitization
#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}

/// Remove scripts, styles, event handlers and `javascript:` URLs while
/// preserving content structure.
pub fn sanitize_html(html: &str) -> Result<String, SanitizeError> {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                // Remove script elements entirely
                element!("script", |el| {
                    el.remove();
                    Ok(())
                }),
                // Remove style elements (hosts style highlights via classes)
                element!("style", |el| {
                    el.remove();
                    Ok(())
                }),
                // Strip dangerous attributes from all elements
                element!("*", |el| {
                    for attr in ["onclick", "onload", "onerror", "onmouseover", "onfocus"] {
                        el.remove_attribute(attr);
                    }
                    if let Some(href) = el.get_attribute("href") {
                        if href.trim().to_lowercase().starts_with("javascript:") {
                            el.remove_attribute("href");
                        }
                    }
                    if let Some(src) = el.get_attribute("src") {
                        if src.trim().to_lowercase().starts_with("javascript:") {
                            el.remove_attribute("src");
                        }
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| SanitizeError::Rewrite(e.to_string()))?;

    Ok(result)
}
