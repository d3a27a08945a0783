//! Configuration management

use std::env;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub persistence: PersistenceConfig,
    pub reader: ReaderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Base URL of the annotation persistence API.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReaderConfig {
    /// Context characters on each side of a snippet.
    pub snippet_context: usize,
    /// Privileged viewers see edit/delete affordances and empty markers.
    pub privileged: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            persistence: PersistenceConfig {
                base_url: "http://localhost:3000/api/v1".to_string(),
            },
            reader: ReaderConfig {
                snippet_context: 40,
                privileged: false,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            persistence: PersistenceConfig {
                base_url: env::var("MARGINALIA_PERSISTENCE_URL")?,
            },
            reader: ReaderConfig {
                snippet_context: env::var("MARGINALIA_SNIPPET_CONTEXT")
                    .unwrap_or_else(|_| "40".to_string())
                    .parse()
                    .unwrap_or(40),
                privileged: env::var("MARGINALIA_PRIVILEGED")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            },
        })
    }
}
