//! Plugin system error types with clear, actionable messages.
//!
//! All errors include the plugin name and relevant context to help
//! developers quickly identify and fix issues.

use thiserror::Error;

/// Errors that can occur while registering plugins.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The .info.toml manifest could not be parsed or failed validation.
    #[error("plugin '{plugin}': failed to parse manifest: {details}")]
    InvalidManifest { plugin: String, details: String },

    /// Plugin declares a tap that doesn't exist.
    #[error("plugin '{plugin}': declares unknown tap '{tap}'. Valid taps: {valid_taps}")]
    UnknownTap {
        plugin: String,
        tap: String,
        valid_taps: String,
    },

    /// Manifest name and `Plugin::name` disagree.
    #[error("plugin '{plugin}': manifest is named '{manifest}', rename one so they match")]
    NameMismatch { plugin: String, manifest: String },

    /// A plugin with this name is already registered.
    #[error("plugin '{plugin}': already registered")]
    Duplicate { plugin: String },

    /// Plugin depends on another plugin that isn't registered.
    #[error("plugin '{plugin}': depends on '{dependency}' which is not installed")]
    MissingDependency { plugin: String, dependency: String },

    /// Circular dependency detected.
    #[error("circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },
}

impl PluginError {
    /// Create an unknown tap error.
    pub fn unknown_tap(plugin: impl Into<String>, tap: impl Into<String>, valid: &[&str]) -> Self {
        Self::UnknownTap {
            plugin: plugin.into(),
            tap: tap.into(),
            valid_taps: valid.join(", "),
        }
    }
}
