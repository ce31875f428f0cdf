//! Tap registry - indexes which plugins implement which taps.
//!
//! The registry maps tap names to an ordered list of plugins that implement them.
//! Plugins are sorted by weight (lower = higher priority, called first); equal
//! weights keep dependency order.

use std::collections::HashMap;
use std::sync::Arc;

use crate::plugin::{LoadedPlugin, PluginError, PluginRuntime};

/// A registered tap handler with plugin reference and priority.
#[derive(Debug, Clone)]
pub struct TapHandler {
    /// The plugin that implements this tap.
    pub plugin: Arc<LoadedPlugin>,
    /// Weight for ordering (lower = higher priority).
    pub weight: i32,
}

/// Registry mapping tap names to ordered handlers.
///
/// When a tap is invoked, handlers are called in weight order.
/// Multiple plugins can implement the same tap.
#[derive(Debug, Default)]
pub struct TapRegistry {
    /// Map from tap name to ordered list of handlers.
    handlers: HashMap<String, Vec<TapHandler>>,
}

impl TapRegistry {
    /// Build a tap registry from registered plugins.
    ///
    /// Scans all plugins for their implemented taps and indexes them.
    /// Fails if a plugin's dependencies are missing or circular.
    pub fn from_plugins(runtime: &PluginRuntime) -> Result<Self, PluginError> {
        let mut handlers: HashMap<String, Vec<TapHandler>> = HashMap::new();

        for name in runtime.load_order()? {
            let Some(plugin) = runtime.get_plugin(&name) else {
                continue;
            };
            let weight = plugin.info.taps.weight;

            for tap_name in &plugin.info.taps.implements {
                let handler = TapHandler {
                    plugin: Arc::clone(&plugin),
                    weight,
                };

                handlers.entry(tap_name.clone()).or_default().push(handler);
            }
        }

        // Stable sort keeps dependency order within equal weights
        for handlers_list in handlers.values_mut() {
            handlers_list.sort_by_key(|h| h.weight);
        }

        Ok(Self { handlers })
    }

    /// Get handlers for a tap, in weight order.
    ///
    /// Returns an empty slice if no plugins implement the tap.
    pub fn get_handlers(&self, tap_name: &str) -> &[TapHandler] {
        self.handlers
            .get(tap_name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Check if any plugin implements a tap.
    pub fn has_tap(&self, tap_name: &str) -> bool {
        self.handlers
            .get(tap_name)
            .is_some_and(|handlers| !handlers.is_empty())
    }

    /// Get all registered tap names.
    pub fn tap_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|s| s.as_str())
    }

    /// Get the count of handlers for a tap.
    pub fn handler_count(&self, tap_name: &str) -> usize {
        self.handlers.get(tap_name).map(|v| v.len()).unwrap_or(0)
    }

    /// Get total number of registered taps.
    pub fn tap_count(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use marquee_sdk::Plugin;

    struct Named(&'static str);

    impl Plugin for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn register(runtime: &mut PluginRuntime, name: &'static str, taps: &[&str], weight: i32) {
        let taps: Vec<String> = taps.iter().map(|t| format!("\"{t}\"")).collect();
        let manifest = format!(
            "name = \"{name}\"\ndescription = \"test\"\nversion = \"1.0.0\"\n\n[taps]\nimplements = [{}]\nweight = {weight}\n",
            taps.join(", ")
        );
        runtime.register(&manifest, Arc::new(Named(name))).unwrap();
    }

    #[test]
    fn registry_from_empty_runtime() {
        let registry = TapRegistry::from_plugins(&PluginRuntime::new()).unwrap();

        assert_eq!(registry.tap_count(), 0);
        assert!(!registry.has_tap("tap_item_view"));
        assert!(registry.get_handlers("tap_item_view").is_empty());
    }

    #[test]
    fn registry_indexes_plugin_taps() {
        let mut runtime = PluginRuntime::new();
        register(&mut runtime, "movie", &["tap_item_info", "tap_item_view"], 0);

        let registry = TapRegistry::from_plugins(&runtime).unwrap();

        assert!(registry.has_tap("tap_item_info"));
        assert!(registry.has_tap("tap_item_view"));
        assert!(!registry.has_tap("tap_item_save"));
        assert_eq!(registry.handler_count("tap_item_view"), 1);

        let handlers = registry.get_handlers("tap_item_view");
        assert_eq!(handlers[0].plugin.info.name, "movie");
        assert_eq!(handlers[0].weight, 0);

        let mut names: Vec<_> = registry.tap_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["tap_item_info", "tap_item_view"]);
    }

    #[test]
    fn handlers_sorted_by_weight() {
        let mut runtime = PluginRuntime::new();
        register(&mut runtime, "heavy", &["tap_item_view"], 10);
        register(&mut runtime, "light", &["tap_item_view"], -5);
        register(&mut runtime, "middle", &["tap_item_view"], 0);

        let registry = TapRegistry::from_plugins(&runtime).unwrap();
        let order: Vec<_> = registry
            .get_handlers("tap_item_view")
            .iter()
            .map(|h| h.plugin.info.name.as_str())
            .collect();

        assert_eq!(order, vec!["light", "middle", "heavy"]);
    }

    #[test]
    fn registry_unknown_tap_returns_empty() {
        let registry = TapRegistry::from_plugins(&PluginRuntime::new()).unwrap();

        assert!(!registry.has_tap("nonexistent_tap"));
        assert!(registry.get_handlers("nonexistent_tap").is_empty());
        assert_eq!(registry.handler_count("nonexistent_tap"), 0);
    }
}
