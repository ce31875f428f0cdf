//! Content type registry.
//!
//! Manages content type definitions collected from plugins via tap_item_info.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};

use crate::tap::TapDispatcher;
use marquee_sdk::types::ContentTypeDefinition;

/// Registry of content types.
///
/// Content types are collected from plugins at startup and cached
/// in memory for fast access.
#[derive(Clone, Default)]
pub struct ContentTypeRegistry {
    types: Arc<DashMap<String, ContentTypeDefinition>>,
}

impl ContentTypeRegistry {
    /// Create an empty content type registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sync content types from plugins via tap_item_info.
    ///
    /// When two plugins declare the same machine name, the first (lightest)
    /// one wins and the later definition is logged and ignored.
    pub fn sync_from_plugins(&self, dispatcher: &TapDispatcher) -> usize {
        info!("syncing content types from plugins");

        let mut synced_count = 0;

        for result in dispatcher.item_info() {
            for def in result.output {
                if self.exists(&def.machine_name) {
                    warn!(
                        plugin = %result.plugin_name,
                        type_name = %def.machine_name,
                        "content type already registered; ignoring"
                    );
                    continue;
                }
                self.register(def);
                synced_count += 1;
            }
        }

        info!(count = synced_count, "content types synced from plugins");
        synced_count
    }

    /// Register (or replace) a content type definition.
    pub fn register(&self, def: ContentTypeDefinition) {
        info!(type_name = %def.machine_name, slug = %def.slug, "registered content type");
        self.types.insert(def.machine_name.clone(), def);
    }

    /// Get a content type by machine name.
    pub fn get(&self, type_name: &str) -> Option<ContentTypeDefinition> {
        self.types.get(type_name).map(|r| r.clone())
    }

    /// Find a content type by its URL slug.
    pub fn by_slug(&self, slug: &str) -> Option<ContentTypeDefinition> {
        self.types
            .iter()
            .find(|r| r.slug == slug)
            .map(|r| r.value().clone())
    }

    /// List all content types, sorted by machine name.
    pub fn list(&self) -> Vec<ContentTypeDefinition> {
        let mut types: Vec<_> = self.types.iter().map(|r| r.value().clone()).collect();
        types.sort_by(|a, b| a.machine_name.cmp(&b.machine_name));
        types
    }

    /// List content type names.
    pub fn type_names(&self) -> Vec<String> {
        self.types.iter().map(|r| r.key().clone()).collect()
    }

    /// Check if a content type exists.
    pub fn exists(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Get the number of registered content types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for ContentTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentTypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
