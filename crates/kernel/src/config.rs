//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Kernel configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Lifetime of an anti-forgery token in seconds (default: 3600).
    pub csrf_token_ttl_secs: i64,

    /// Maximum number of live tokens kept per session (default: 10).
    pub csrf_max_tokens: usize,

    /// Tracing filter used when `RUST_LOG` is not set (default: "info").
    pub log_filter: String,

    /// Directory of Tera templates overriding the built-in ones.
    pub template_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csrf_token_ttl_secs: 3600,
            csrf_max_tokens: 10,
            log_filter: "info".to_string(),
            template_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let csrf_token_ttl_secs = lookup("CSRF_TOKEN_TTL_SECS")
            .unwrap_or_else(|| "3600".to_string())
            .parse()
            .context("CSRF_TOKEN_TTL_SECS must be a valid i64")?;

        let csrf_max_tokens = lookup("CSRF_MAX_TOKENS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("CSRF_MAX_TOKENS must be a valid usize")?;

        let log_filter = lookup("LOG_FILTER").unwrap_or_else(|| "info".to_string());

        let template_dir = lookup("TEMPLATE_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            csrf_token_ttl_secs,
            csrf_max_tokens,
            log_filter,
            template_dir,
        })
    }
}
