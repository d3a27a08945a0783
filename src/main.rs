//! Marginalia demo binary
//!
//! Renders a markdown article, loads its annotation set through the store
//! lifecycle, splices highlight markers into the rendered HTML, and prints
//! the sanitized result. With `MARGINALIA_PERSISTENCE_URL` set the
//! annotation blob is fetched over HTTP; otherwise it is read from the
//! optional second argument and served from in-memory persistence.
//!
//! Usage: `marginalia <article.md> [annotations.json]`

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marginalia::config::Config;
use marginalia::html::{apply_annotations, sanitize_html, HighlightConfig};
use marginalia::render::{ContentRenderer, MarkdownRenderer, RenderOptions};
use marginalia::store::{
    AnnotationPersistence, AnnotationStore, HttpPersistence, InMemoryPersistence,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marginalia=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let article_path = args
        .next()
        .context("usage: marginalia <article.md> [annotations.json]")?;
    let blob_path = args.next();

    let source = std::fs::read_to_string(&article_path)
        .with_context(|| format!("failed to read article {article_path}"))?;
    let article_id = Path::new(&article_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("article")
        .to_string();

    let persistence: Arc<dyn AnnotationPersistence> = match Config::from_env() {
        Ok(config) => {
            tracing::info!(base_url = %config.persistence.base_url, "Using HTTP persistence");
            Arc::new(HttpPersistence::new(&config.persistence.base_url))
        }
        Err(_) => match &blob_path {
            Some(path) => {
                let blob = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read annotations {path}"))?;
                Arc::new(InMemoryPersistence::seeded(&article_id, &blob))
            }
            None => Arc::new(InMemoryPersistence::default()),
        },
    };

    let mut store = AnnotationStore::new(&article_id, persistence);
    store.load().await?;
    tracing::info!(
        article_id = %article_id,
        annotations = store.annotations().len(),
        "Annotation set loaded"
    );

    let renderer = MarkdownRenderer;
    let rendered = renderer.render(&source, &RenderOptions::default());

    let result = apply_annotations(&rendered, store.annotations(), &HighlightConfig::default())?;
    if !result.skipped.is_empty() {
        tracing::warn!(
            skipped = result.skipped.len(),
            "Some annotations did not resolve against the current rendering"
        );
    }

    let html = sanitize_html(&result.html)?;
    println!("{html}");

    Ok(())
}
