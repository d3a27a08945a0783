//! HTTP persistence client
//!
//! Talks to the external persistence API: one GET/PUT endpoint per article
//! holding the annotation blob. No retries, timeouts, or sequencing beyond
//! what the transport enforces by default.

use async_trait::async_trait;
use reqwest::StatusCode;

use super::persistence::{AnnotationPersistence, PersistenceError};

/// Blob persistence over HTTP.
pub struct HttpPersistence {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPersistence {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn blob_url(&self, article_id: &str) -> String {
        format!("{}/articles/{}/annotations", self.base_url, article_id)
    }
}

impl From<reqwest::Error> for PersistenceError {
    fn from(e: reqwest::Error) -> Self {
        PersistenceError::Transport(e.to_string())
    }
}

#[async_trait]
impl AnnotationPersistence for HttpPersistence {
    async fn load_blob(&self, article_id: &str) -> Result<Option<String>, PersistenceError> {
        let response = self.client.get(self.blob_url(article_id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(PersistenceError::Service {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(Some(response.text().await?))
    }

    async fn save_blob(&self, article_id: &str, blob: &str) -> Result<(), PersistenceError> {
        let response = self
            .client
            .put(self.blob_url(article_id))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(blob.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PersistenceError::Service {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }
}
