//! Per-request state for tap execution.
//!
//! Each kernel operation runs against a `RequestState` describing who is
//! calling and which session their anti-forgery tokens belong to.

use uuid::Uuid;

use marquee_sdk::types::UserContext;

/// Per-request state passed to kernel operations.
///
/// Provides:
/// - User context (ID, authentication status, permissions)
/// - The session that minted tokens are bound to
#[derive(Debug, Clone)]
pub struct RequestState {
    /// User context for this request.
    pub user: UserContext,
    /// Session identifier used to scope anti-forgery tokens.
    session_id: String,
}

impl RequestState {
    /// Start a request in a fresh session.
    pub fn new(user: UserContext) -> Self {
        Self::with_session(user, Uuid::new_v4().to_string())
    }

    /// Continue an existing session (e.g., the save that follows a form render).
    pub fn with_session(user: UserContext, session_id: impl Into<String>) -> Self {
        Self {
            user,
            session_id: session_id.into(),
        }
    }

    /// The session this request belongs to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get current user ID as string (for logging).
    pub fn user_id_string(&self) -> String {
        self.user.id.to_string()
    }
}

impl Default for RequestState {
    fn default() -> Self {
        Self::new(UserContext::anonymous())
    }
}
