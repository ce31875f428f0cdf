//! Tap dispatcher - invokes plugin taps in weight order.
//!
//! The dispatcher calls all plugins implementing a tap, collecting their results.
//! `dispatch` logs and skips failing plugins so the others still run;
//! `try_dispatch` stops at the first failure and hands it to the caller.

use std::sync::Arc;

use tracing::{debug, error};

use super::{TapHandler, TapRegistry};
use crate::error::KernelError;
use marquee_sdk::host::TapContext;
use marquee_sdk::render::RenderElement;
use marquee_sdk::types::{ContentTypeDefinition, Item, PermissionDefinition, SaveRequest};
use marquee_sdk::{Plugin, TapError};

/// Result from a single tap invocation.
#[derive(Debug)]
pub struct TapResult<T> {
    /// Plugin that produced this result.
    pub plugin_name: String,
    /// Output of the tap.
    pub output: T,
}

/// Dispatcher for invoking taps across plugins.
#[derive(Debug, Clone)]
pub struct TapDispatcher {
    registry: Arc<TapRegistry>,
}

impl TapDispatcher {
    /// Create a new tap dispatcher.
    pub fn new(registry: Arc<TapRegistry>) -> Self {
        Self { registry }
    }

    /// Get the tap registry for handler introspection.
    pub fn registry(&self) -> &TapRegistry {
        &self.registry
    }

    /// Dispatch a tap to all implementing plugins.
    ///
    /// Calls `invoke` on each plugin in weight order, collecting results.
    /// If a plugin errors, it is logged and skipped.
    pub fn dispatch<T>(
        &self,
        tap_name: &str,
        mut invoke: impl FnMut(&dyn Plugin) -> Result<T, TapError>,
    ) -> Vec<TapResult<T>> {
        let handlers = self.registry.get_handlers(tap_name);
        if handlers.is_empty() {
            debug!(tap = %tap_name, "no handlers registered for tap");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(handlers.len());

        for handler in handlers {
            match invoke(handler.plugin.plugin.as_ref()) {
                Ok(output) => results.push(TapResult {
                    plugin_name: plugin_name(handler),
                    output,
                }),
                Err(e) => {
                    error!(
                        plugin = %handler.plugin.info.name,
                        tap = %tap_name,
                        error = %e,
                        "tap invocation failed"
                    );
                }
            }
        }

        debug!(
            tap = %tap_name,
            handlers = handlers.len(),
            results = results.len(),
            "dispatch complete"
        );

        results
    }

    /// Dispatch a tap, stopping at the first plugin that fails.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::Tap`] naming the failing plugin.
    pub fn try_dispatch<T>(
        &self,
        tap_name: &str,
        mut invoke: impl FnMut(&dyn Plugin) -> Result<T, TapError>,
    ) -> Result<Vec<TapResult<T>>, KernelError> {
        let handlers = self.registry.get_handlers(tap_name);
        let mut results = Vec::with_capacity(handlers.len());

        for handler in handlers {
            let output = invoke(handler.plugin.plugin.as_ref()).map_err(|source| {
                error!(
                    plugin = %handler.plugin.info.name,
                    tap = %tap_name,
                    error = %source,
                    "tap invocation failed"
                );
                KernelError::Tap {
                    plugin: plugin_name(handler),
                    tap: tap_name.to_string(),
                    source,
                }
            })?;
            results.push(TapResult {
                plugin_name: plugin_name(handler),
                output,
            });
        }

        debug!(tap = %tap_name, results = results.len(), "dispatch complete");
        Ok(results)
    }

    /// `tap_item_info`: every content type definition, in weight order.
    pub fn item_info(&self) -> Vec<TapResult<Vec<ContentTypeDefinition>>> {
        self.dispatch("tap_item_info", |p| Ok(p.item_info()))
    }

    /// `tap_perm`: every permission definition, in weight order.
    pub fn perm(&self) -> Vec<TapResult<Vec<PermissionDefinition>>> {
        self.dispatch("tap_perm", |p| Ok(p.perm()))
    }

    /// `tap_item_form`: edit-screen panels for an item.
    pub fn item_form(&self, ctx: &TapContext<'_>, item: &Item) -> Vec<TapResult<RenderElement>> {
        flatten(self.dispatch("tap_item_form", |p| p.item_form(ctx, item)))
    }

    /// `tap_item_save`: let every plugin react to a submitted save.
    ///
    /// # Errors
    ///
    /// The first plugin failure is returned; later plugins are not called.
    pub fn item_save(
        &self,
        ctx: &TapContext<'_>,
        item: &Item,
        save: &SaveRequest,
    ) -> Result<(), KernelError> {
        self.try_dispatch("tap_item_save", |p| p.item_save(ctx, item, save))?;
        Ok(())
    }

    /// `tap_item_view`: blocks to render ahead of an item's body.
    pub fn item_view(&self, ctx: &TapContext<'_>, item: &Item) -> Vec<TapResult<RenderElement>> {
        flatten(self.dispatch("tap_item_view", |p| p.item_view(ctx, item)))
    }
}

fn plugin_name(handler: &TapHandler) -> String {
    handler.plugin.info.name.clone()
}

/// Drop results from plugins that had nothing to contribute.
fn flatten<T>(results: Vec<TapResult<Option<T>>>) -> Vec<TapResult<T>> {
    results
        .into_iter()
        .filter_map(|r| {
            r.output.map(|output| TapResult {
                plugin_name: r.plugin_name,
                output,
            })
        })
        .collect()
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::plugin::PluginRuntime;
    use marquee_sdk::HostError;

    struct Echo {
        name: &'static str,
    }

    impl Plugin for Echo {
        fn name(&self) -> &str {
            self.name
        }

        fn perm(&self) -> Vec<PermissionDefinition> {
            vec![PermissionDefinition::new(self.name, "echo")]
        }
    }

    fn dispatcher(plugins: &[(&'static str, i32)]) -> TapDispatcher {
        let mut runtime = PluginRuntime::new();
        for &(name, weight) in plugins {
            let manifest = format!(
                "name = \"{name}\"\ndescription = \"echo\"\nversion = \"1.0.0\"\n\n[taps]\nimplements = [\"tap_perm\", \"tap_item_save\"]\nweight = {weight}\n"
            );
            runtime
                .register(&manifest, Arc::new(Echo { name }))
                .unwrap();
        }
        TapDispatcher::new(Arc::new(TapRegistry::from_plugins(&runtime).unwrap()))
    }

    fn failing(p: &dyn Plugin) -> Result<String, TapError> {
        if p.name().starts_with("bad") {
            Err(HostError::StorageUnavailable(p.name().to_string()).into())
        } else {
            Ok(p.name().to_string())
        }
    }

    #[test]
    fn dispatch_empty_tap() {
        let dispatcher = dispatcher(&[]);
        let results = dispatcher.dispatch("tap_item_view", |p| Ok(p.name().to_string()));
        assert!(results.is_empty());
    }

    #[test]
    fn dispatch_collects_in_weight_order() {
        let dispatcher = dispatcher(&[("second", 1), ("first", 0)]);
        let results = dispatcher.perm();

        let names: Vec<_> = results.iter().map(|r| r.plugin_name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(results[0].output[0].name, "first");
    }

    #[test]
    fn dispatch_skips_failing_plugins() {
        let dispatcher = dispatcher(&[("bad", 0), ("good", 1)]);
        let results = dispatcher.dispatch("tap_perm", failing);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].output, "good");
    }

    #[test]
    fn try_dispatch_stops_at_first_failure() {
        let dispatcher = dispatcher(&[("bad", 0), ("good", 1)]);
        let mut called = Vec::new();
        let err = dispatcher
            .try_dispatch("tap_item_save", |p| {
                called.push(p.name().to_string());
                failing(p)
            })
            .unwrap_err();

        assert_eq!(called, vec!["bad"]);
        match err {
            KernelError::Tap { plugin, tap, .. } => {
                assert_eq!(plugin, "bad");
                assert_eq!(tap, "tap_item_save");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn registry_accessor_returns_same_registry() {
        let dispatcher = dispatcher(&[("only", 0)]);
        assert_eq!(dispatcher.registry().handler_count("tap_perm"), 1);
        assert_eq!(dispatcher.registry().tap_count(), 2);
    }
}
