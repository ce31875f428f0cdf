//! Parser for plugin `.info.toml` manifest files.
//!
//! Each plugin ships a `{name}.info.toml` manifest that declares metadata:
//! - name, version, description
//! - dependencies (other plugins that must be registered too)
//! - taps (which hook functions the plugin implements)

use serde::Deserialize;

use super::error::PluginError;

/// Plugin metadata parsed from `.info.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginInfo {
    /// Plugin machine name (must match the plugin's `Plugin::name`).
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Semantic version (e.g., "1.0.0").
    pub version: String,

    /// Other plugins this one depends on (ordered first).
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Tap configuration.
    #[serde(default)]
    pub taps: TapConfig,
}

/// Configuration for which taps a plugin implements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TapConfig {
    /// List of tap names this plugin implements.
    /// E.g., ["tap_item_info", "tap_item_view"]
    #[serde(default)]
    pub implements: Vec<String>,

    /// Weight for ordering (lower = higher priority, default 0).
    #[serde(default)]
    pub weight: i32,
}

/// Known tap names for validation.
pub const KNOWN_TAPS: &[&str] = &[
    // Content types
    "tap_item_info",
    // Permissions
    "tap_perm",
    // Item editing
    "tap_item_form",
    "tap_item_save",
    // Rendering
    "tap_item_view",
];

impl PluginInfo {
    /// Parse plugin info from a TOML string.
    ///
    /// `origin` names where the manifest came from and appears in errors.
    pub fn parse_str(content: &str, origin: &str) -> Result<Self, PluginError> {
        let info: PluginInfo = toml::from_str(content).map_err(|e| PluginError::InvalidManifest {
            plugin: origin.to_string(),
            details: e.to_string(),
        })?;

        info.validate()?;
        Ok(info)
    }

    /// Whether the manifest declares the given tap.
    pub fn implements(&self, tap_name: &str) -> bool {
        self.taps.implements.iter().any(|t| t == tap_name)
    }

    /// Validate the parsed plugin info.
    fn validate(&self) -> Result<(), PluginError> {
        if self.name.is_empty() {
            return Err(PluginError::InvalidManifest {
                plugin: "<unnamed>".to_string(),
                details: "empty 'name' field".to_string(),
            });
        }

        if self.version.is_empty() {
            return Err(PluginError::InvalidManifest {
                plugin: self.name.clone(),
                details: "empty 'version' field".to_string(),
            });
        }

        if self.dependencies.iter().any(|d| *d == self.name) {
            return Err(PluginError::CircularDependency {
                cycle: format!("{0} -> {0}", self.name),
            });
        }

        for tap in &self.taps.implements {
            if !KNOWN_TAPS.contains(&tap.as_str()) {
                return Err(PluginError::unknown_tap(&self.name, tap, KNOWN_TAPS));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_info() {
        let toml = r#"
name = "movie"
description = "Provides a movie content type"
version = "1.0.0"
dependencies = ["media"]

[taps]
implements = ["tap_item_info", "tap_item_view", "tap_item_save", "tap_perm"]
weight = 5
"#;

        let info = PluginInfo::parse_str(toml, "test.toml").unwrap();
        assert_eq!(info.name, "movie");
        assert_eq!(info.version, "1.0.0");
        assert_eq!(info.dependencies, vec!["media"]);
        assert_eq!(info.taps.implements.len(), 4);
        assert_eq!(info.taps.weight, 5);
        assert!(info.implements("tap_item_view"));
        assert!(!info.implements("tap_item_form"));
    }

    #[test]
    fn parse_minimal_info() {
        let toml = r#"
name = "minimal"
description = "A minimal plugin"
version = "0.1.0"
"#;

        let info = PluginInfo::parse_str(toml, "test.toml").unwrap();
        assert_eq!(info.name, "minimal");
        assert!(info.dependencies.is_empty());
        assert!(info.taps.implements.is_empty());
        assert_eq!(info.taps.weight, 0);
    }

    #[test]
    fn reject_unknown_tap() {
        let toml = r#"
name = "bad"
description = "Bad plugin"
version = "1.0.0"

[taps]
implements = ["tap_unknown_function"]
"#;

        let err = PluginInfo::parse_str(toml, "test.toml").unwrap_err();
        assert!(matches!(err, PluginError::UnknownTap { .. }));
        assert!(err.to_string().contains("unknown tap"));
    }

    #[test]
    fn reject_empty_name() {
        let toml = r#"
name = ""
description = "Empty name"
version = "1.0.0"
"#;

        let err = PluginInfo::parse_str(toml, "test.toml").unwrap_err();
        assert!(err.to_string().contains("empty 'name'"));
    }

    #[test]
    fn reject_empty_version() {
        let toml = r#"
name = "test"
description = "Empty version"
version = ""
"#;

        let err = PluginInfo::parse_str(toml, "test.toml").unwrap_err();
        assert!(err.to_string().contains("empty 'version'"));
    }

    #[test]
    fn reject_self_dependency() {
        let toml = r#"
name = "loop"
description = "Depends on itself"
version = "1.0.0"
dependencies = ["loop"]
"#;

        let err = PluginInfo::parse_str(toml, "test.toml").unwrap_err();
        assert!(matches!(err, PluginError::CircularDependency { .. }));
    }

    #[test]
    fn reject_malformed_toml() {
        let err = PluginInfo::parse_str("name = ", "broken.info.toml").unwrap_err();
        assert!(matches!(err, PluginError::InvalidManifest { .. }));
        assert!(err.to_string().contains("broken.info.toml"));
    }
}
