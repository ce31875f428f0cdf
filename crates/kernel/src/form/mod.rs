//! Form support.
//!
//! Plugins describe their forms as render elements; the kernel only owns
//! the anti-forgery tokens that tie a submitted form to the session that
//! rendered it.

pub mod csrf;

pub use csrf::{CsrfTokenStore, SessionTokens};
