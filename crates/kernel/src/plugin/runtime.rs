//! Plugin runtime.
//!
//! Holds every registered plugin together with its parsed manifest.
//! Plugins are registered explicitly by whoever boots the kernel; there is
//! no global plugin list.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::dependency::resolve_load_order;
use super::error::PluginError;
use super::info_parser::PluginInfo;
use marquee_sdk::Plugin;

/// A registered plugin ready for tap dispatch.
pub struct LoadedPlugin {
    /// Plugin metadata from .info.toml.
    pub info: PluginInfo,
    /// The plugin implementation.
    pub plugin: Arc<dyn Plugin>,
}

impl std::fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Plugin runtime managing registered plugins.
#[derive(Debug, Default)]
pub struct PluginRuntime {
    /// Registered plugins indexed by name.
    plugins: HashMap<String, Arc<LoadedPlugin>>,
}

impl PluginRuntime {
    /// Create an empty plugin runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin with its `.info.toml` manifest.
    ///
    /// The manifest name must match `Plugin::name`, and a name can only be
    /// registered once. Dependencies are checked later by
    /// [`load_order`](Self::load_order), so plugins may register in any order.
    pub fn register(&mut self, manifest: &str, plugin: Arc<dyn Plugin>) -> Result<(), PluginError> {
        let info = PluginInfo::parse_str(manifest, plugin.name())?;

        if info.name != plugin.name() {
            return Err(PluginError::NameMismatch {
                plugin: plugin.name().to_string(),
                manifest: info.name,
            });
        }

        if self.plugins.contains_key(&info.name) {
            return Err(PluginError::Duplicate { plugin: info.name });
        }

        debug!(
            plugin = %info.name,
            version = %info.version,
            taps = ?info.taps.implements,
            "registered plugin"
        );

        self.plugins
            .insert(info.name.clone(), Arc::new(LoadedPlugin { info, plugin }));

        Ok(())
    }

    /// Get a registered plugin by name.
    pub fn get_plugin(&self, name: &str) -> Option<Arc<LoadedPlugin>> {
        self.plugins.get(name).cloned()
    }

    /// Get all registered plugins.
    pub fn plugins(&self) -> &HashMap<String, Arc<LoadedPlugin>> {
        &self.plugins
    }

    /// Get the number of registered plugins.
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Dependency-respecting order of all registered plugins.
    pub fn load_order(&self) -> Result<Vec<String>, PluginError> {
        let infos: HashMap<String, PluginInfo> = self
            .plugins
            .iter()
            .map(|(name, p)| (name.clone(), p.info.clone()))
            .collect();

        let order = resolve_load_order(&infos)?;
        info!(count = order.len(), "resolved plugin order");
        Ok(order)
    }
}
