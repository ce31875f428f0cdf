//! Marquee Plugin SDK
//!
//! Types, traits, and host service seams for Marquee plugins.
//! Plugins depend on this crate, implement [`Plugin`], and talk to the
//! kernel only through the services handed to them in a [`host::TapContext`].

pub mod host;
pub mod host_errors;
pub mod plugin;
pub mod render;
pub mod types;

pub use host_errors::{HostError, TapError};
pub use plugin::Plugin;

// Re-export serde_json so plugins building element attributes share the kernel's version
#[doc(hidden)]
pub use serde_json;

pub mod prelude {
    pub use crate::host::{AccessCheck, FormTokens, MetaStore, TapContext, TextSanitizer};
    pub use crate::host_errors::{HostError, TapError};
    pub use crate::plugin::Plugin;
    pub use crate::render;
    pub use crate::render::RenderElement;
    pub use crate::types::*;
}
