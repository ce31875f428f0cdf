//! Item attribute storage.
//!
//! Attributes are `(item_id, key) -> value` pairs. An item's attribute map
//! exists exactly as long as the item does: [`ItemService`](super::ItemService)
//! attaches it on create and detaches it on delete.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use marquee_sdk::HostError;
use marquee_sdk::host::MetaStore;

/// In-memory attribute store shared between request handlers.
#[derive(Clone, Default)]
pub struct MetaStorage {
    inner: Arc<DashMap<Uuid, HashMap<String, String>>>,
}

impl MetaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking attributes for a new item.
    pub(crate) fn attach(&self, item_id: Uuid) {
        self.inner.entry(item_id).or_default();
    }

    /// Drop every attribute of a deleted item. Returns how many were removed.
    pub(crate) fn detach(&self, item_id: Uuid) -> usize {
        let removed = self
            .inner
            .remove(&item_id)
            .map(|(_, attrs)| attrs.len())
            .unwrap_or(0);
        debug!(item_id = %item_id, removed, "detached item attributes");
        removed
    }

    /// All attributes of an item, sorted by key.
    pub fn all(&self, item_id: Uuid) -> Vec<(String, String)> {
        let mut attrs: Vec<_> = self
            .inner
            .get(&item_id)
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default();
        attrs.sort();
        attrs
    }

    /// Number of attributes stored for an item.
    pub fn count(&self, item_id: Uuid) -> usize {
        self.inner.get(&item_id).map(|a| a.len()).unwrap_or(0)
    }
}

fn check_key(key: &str) -> Result<(), HostError> {
    if key.trim().is_empty() {
        return Err(HostError::InvalidKey(key.to_string()));
    }
    Ok(())
}

impl MetaStore for MetaStorage {
    fn get_meta(&self, item_id: Uuid, key: &str) -> Result<Option<String>, HostError> {
        check_key(key)?;
        Ok(self
            .inner
            .get(&item_id)
            .and_then(|attrs| attrs.get(key).cloned()))
    }

    fn set_meta(&self, item_id: Uuid, key: &str, value: &str) -> Result<(), HostError> {
        check_key(key)?;
        let mut attrs = self
            .inner
            .get_mut(&item_id)
            .ok_or(HostError::ItemNotFound(item_id))?;
        attrs.insert(key.to_string(), value.to_string());
        debug!(item_id = %item_id, key = %key, "stored attribute");
        Ok(())
    }
}

impl std::fmt::Debug for MetaStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaStorage")
            .field("items", &self.inner.len())
            .finish()
    }
}
