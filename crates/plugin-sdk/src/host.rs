//! Host services available to plugins during a tap invocation.
//!
//! The kernel implements these traits and lends them to plugins through a
//! [`TapContext`] built fresh for each request. Plugins never hold on to a
//! context beyond the tap call.

use uuid::Uuid;

use crate::host_errors::HostError;
use crate::types::UserContext;

/// Key-value attribute storage attached to content items.
pub trait MetaStore {
    /// Read an attribute. `Ok(None)` means the attribute was never set.
    ///
    /// # Errors
    ///
    /// Returns the storage failure unchanged; callers are not expected to retry.
    fn get_meta(&self, item_id: Uuid, key: &str) -> Result<Option<String>, HostError>;

    /// Create or overwrite an attribute.
    ///
    /// # Errors
    ///
    /// Returns the storage failure unchanged; callers are not expected to retry.
    fn set_meta(&self, item_id: Uuid, key: &str, value: &str) -> Result<(), HostError>;
}

/// Item-level permission checks.
pub trait AccessCheck {
    /// Whether `user` may edit the item with the given ID.
    fn can_edit(&self, user: &UserContext, item_id: Uuid) -> bool;
}

/// Anti-forgery tokens bound to the current session.
pub trait FormTokens {
    /// Mint a token for `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::TokenUnavailable`] when no session is bound.
    fn mint(&self, scope: &str) -> Result<String, HostError>;

    /// Verify a submitted token against `scope`.
    fn verify(&self, token: &str, scope: &str) -> bool;
}

/// Host-side coercion of untrusted input to plain text.
pub trait TextSanitizer {
    /// Single-line plain text: markup and control characters removed,
    /// whitespace collapsed.
    fn plain_text(&self, raw: &str) -> String;

    /// Multi-line plain text: like [`plain_text`](Self::plain_text) but
    /// line breaks are kept.
    fn plain_textarea(&self, raw: &str) -> String;
}

/// Services and caller identity for one tap invocation.
#[derive(Clone, Copy)]
pub struct TapContext<'a> {
    pub user: &'a UserContext,
    pub meta: &'a dyn MetaStore,
    pub access: &'a dyn AccessCheck,
    pub tokens: &'a dyn FormTokens,
    pub text: &'a dyn TextSanitizer,
}

impl TapContext<'_> {
    /// Read an attribute, treating "never set" as the empty string.
    ///
    /// # Errors
    ///
    /// Propagates the storage failure.
    pub fn meta_or_empty(&self, item_id: Uuid, key: &str) -> Result<String, HostError> {
        Ok(self.meta.get_meta(item_id, key)?.unwrap_or_default())
    }
}

impl std::fmt::Debug for TapContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapContext")
            .field("user", &self.user.id)
            .finish_non_exhaustive()
    }
}
