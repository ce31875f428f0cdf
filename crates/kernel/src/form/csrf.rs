//! CSRF token generation and verification.
//!
//! Tokens are kept per session, bound to a scope (usually one form for one
//! item), time-limited and single-use.

use std::sync::Arc;

use dashmap::DashMap;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::Config;
use marquee_sdk::HostError;
use marquee_sdk::host::FormTokens;

/// A token waiting to be submitted.
#[derive(Debug, Clone)]
struct StoredToken {
    token: String,
    scope: String,
    issued_at: i64,
}

/// Per-session CSRF token storage.
#[derive(Clone)]
pub struct CsrfTokenStore {
    sessions: Arc<DashMap<String, Vec<StoredToken>>>,
    /// Token validity period in seconds.
    validity_secs: i64,
    /// Maximum number of tokens to store per session.
    max_tokens: usize,
}

impl CsrfTokenStore {
    pub fn new(validity_secs: i64, max_tokens: usize) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            validity_secs,
            max_tokens: max_tokens.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.csrf_token_ttl_secs, config.csrf_max_tokens)
    }

    /// Generate a token for `scope` and store it in the session.
    pub fn generate(&self, session_id: &str, scope: &str) -> String {
        self.generate_at(session_id, scope, chrono::Utc::now().timestamp())
    }

    fn generate_at(&self, session_id: &str, scope: &str, now: i64) -> String {
        let mut random_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let mut hasher = Sha256::new();
        hasher.update(random_bytes);
        hasher.update(now.to_le_bytes());
        let token = hex::encode(hasher.finalize());

        let mut tokens = self.sessions.entry(session_id.to_string()).or_default();
        tokens.push(StoredToken {
            token: token.clone(),
            scope: scope.to_string(),
            issued_at: now,
        });

        // Keep only the most recent tokens
        if tokens.len() > self.max_tokens {
            let skip = tokens.len() - self.max_tokens;
            tokens.drain(..skip);
        }

        debug!(scope = %scope, live = tokens.len(), "issued csrf token");
        token
    }

    /// Verify a submitted token for `scope`.
    ///
    /// A matching token is consumed; expired tokens are pruned on the way.
    pub fn verify(&self, session_id: &str, submitted: &str, scope: &str) -> bool {
        self.verify_at(session_id, submitted, scope, chrono::Utc::now().timestamp())
    }

    fn verify_at(&self, session_id: &str, submitted: &str, scope: &str, now: i64) -> bool {
        if submitted.is_empty() {
            return false;
        }

        let Some(mut tokens) = self.sessions.get_mut(session_id) else {
            return false;
        };

        let found = tokens.iter().position(|stored| {
            let same: bool = stored.token.as_bytes().ct_eq(submitted.as_bytes()).into();
            same && stored.scope == scope && now - stored.issued_at <= self.validity_secs
        });

        let Some(index) = found else {
            debug!(scope = %scope, "csrf token rejected");
            return false;
        };

        // Single-use
        tokens.remove(index);
        tokens.retain(|stored| now - stored.issued_at <= self.validity_secs);
        true
    }

    /// Number of live tokens for a session.
    pub fn token_count(&self, session_id: &str) -> usize {
        self.sessions.get(session_id).map(|t| t.len()).unwrap_or(0)
    }

    /// Clear all CSRF tokens from a session.
    pub fn clear_session(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Bind the store to one session for handing to plugins.
    pub fn for_session<'a>(&'a self, session_id: &'a str) -> SessionTokens<'a> {
        SessionTokens {
            store: self,
            session_id,
        }
    }
}

impl Default for CsrfTokenStore {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl std::fmt::Debug for CsrfTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfTokenStore")
            .field("sessions", &self.sessions.len())
            .field("validity_secs", &self.validity_secs)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// [`FormTokens`] for a single session.
#[derive(Debug, Clone, Copy)]
pub struct SessionTokens<'a> {
    store: &'a CsrfTokenStore,
    session_id: &'a str,
}

impl FormTokens for SessionTokens<'_> {
    fn mint(&self, scope: &str) -> Result<String, HostError> {
        if self.session_id.is_empty() {
            return Err(HostError::TokenUnavailable);
        }
        Ok(self.store.generate(self.session_id, scope))
    }

    fn verify(&self, token: &str, scope: &str) -> bool {
        self.store.verify(self.session_id, token, scope)
    }
}
