//! Kernel error types.

use thiserror::Error;
use uuid::Uuid;

use crate::plugin::PluginError;
use marquee_sdk::TapError;

/// Errors surfaced by kernel operations.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("item {0} not found")]
    NotFound(Uuid),

    #[error("unknown content type '{0}'")]
    UnknownContentType(String),

    #[error("unknown permission '{0}'")]
    UnknownPermission(String),

    #[error("plugin '{plugin}': tap '{tap}' failed: {source}")]
    Tap {
        plugin: String,
        tap: String,
        #[source]
        source: TapError,
    },

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("render failed")]
    Render(#[source] anyhow::Error),

    #[error("configuration error")]
    Config(#[source] anyhow::Error),
}

/// Result type alias using KernelError.
pub type KernelResult<T> = Result<T, KernelError>;
