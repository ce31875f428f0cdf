//! Host Service Error Codes
//!
//! Every host service a plugin calls reports failure as a [`HostError`].
//! Each variant carries a stable negative code so failures can be logged
//! and compared without matching on message text.
//!
//! # Standard Error Codes
//!
//! | Code | Variant | Raised by |
//! |------|---------|-----------|
//! | `-1` | [`HostError::StorageUnavailable`] | `MetaStore::get_meta`, `MetaStore::set_meta` |
//! | `-2` | [`HostError::ItemNotFound`] | `MetaStore::set_meta` on a deleted or unknown item |
//! | `-3` | [`HostError::InvalidKey`] | `MetaStore` calls with an empty key |
//! | `-4` | [`HostError::TokenUnavailable`] | `FormTokens::mint` when no session is bound |
//!
//! Permission checks and token verification never fail; they answer
//! `false` instead.

use thiserror::Error;
use uuid::Uuid;

/// Failure reported by a kernel-provided service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("item {0} not found")]
    ItemNotFound(Uuid),

    #[error("invalid attribute key '{0}'")]
    InvalidKey(String),

    #[error("no session bound for token minting")]
    TokenUnavailable,
}

impl HostError {
    /// Stable numeric code for this failure (always negative).
    pub fn code(&self) -> i32 {
        match self {
            HostError::StorageUnavailable(_) => -1,
            HostError::ItemNotFound(_) => -2,
            HostError::InvalidKey(_) => -3,
            HostError::TokenUnavailable => -4,
        }
    }
}

/// Failure returned from a tap implementation.
#[derive(Debug, Error)]
pub enum TapError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("{0}")]
    Plugin(String),
}
