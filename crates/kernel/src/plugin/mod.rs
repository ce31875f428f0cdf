//! Plugin system for Marquee.
//!
//! This module handles:
//! - Parsing plugin metadata from `.info.toml` manifests
//! - Registering plugin implementations against their manifests
//! - Ordering plugins by their declared dependencies

mod dependency;
mod error;
mod info_parser;
mod runtime;

pub use dependency::resolve_load_order;
pub use error::PluginError;
pub use info_parser::{KNOWN_TAPS, PluginInfo, TapConfig};
pub use runtime::{LoadedPlugin, PluginRuntime};
