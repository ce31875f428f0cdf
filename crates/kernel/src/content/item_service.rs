//! Item service.
//!
//! Provides CRUD operations for content items. Items live in memory;
//! their attributes live in the shared [`MetaStorage`].

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{ContentTypeRegistry, MetaStorage};
use crate::error::{KernelError, KernelResult};
use marquee_sdk::types::Item;

/// Input for creating an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    pub item_type: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: i32,
    pub author_id: Uuid,
}

impl NewItem {
    pub fn new(item_type: &str, title: &str, author_id: Uuid) -> Self {
        Self {
            item_type: item_type.into(),
            title: title.into(),
            body: String::new(),
            status: 0,
            author_id,
        }
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.into();
        self
    }

    pub fn published(mut self) -> Self {
        self.status = 1;
        self
    }
}

/// Input for updating an item. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItem {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<i32>,
}

/// Service for item CRUD operations.
#[derive(Clone)]
pub struct ItemService {
    inner: Arc<ItemServiceInner>,
}

struct ItemServiceInner {
    items: DashMap<Uuid, Item>,
    meta: MetaStorage,
    types: ContentTypeRegistry,
}

impl ItemService {
    /// Create a new item service.
    pub fn new(types: ContentTypeRegistry, meta: MetaStorage) -> Self {
        Self {
            inner: Arc::new(ItemServiceInner {
                items: DashMap::new(),
                meta,
                types,
            }),
        }
    }

    /// Create a new item of a registered content type.
    pub fn create(&self, input: NewItem) -> KernelResult<Item> {
        if !self.inner.types.exists(&input.item_type) {
            return Err(KernelError::UnknownContentType(input.item_type));
        }

        let now = chrono::Utc::now().timestamp();
        let item = Item {
            id: Uuid::now_v7(),
            item_type: input.item_type,
            title: input.title,
            body: input.body,
            status: input.status,
            author_id: input.author_id,
            created: now,
            changed: now,
        };

        self.inner.meta.attach(item.id);
        self.inner.items.insert(item.id, item.clone());

        info!(item_id = %item.id, item_type = %item.item_type, "item created");
        Ok(item)
    }

    /// Load an item by ID.
    pub fn load(&self, id: Uuid) -> Option<Item> {
        self.inner.items.get(&id).map(|i| i.clone())
    }

    /// Load an item by ID, failing with [`KernelError::NotFound`].
    pub fn require(&self, id: Uuid) -> KernelResult<Item> {
        self.load(id).ok_or(KernelError::NotFound(id))
    }

    /// Update an item's columns.
    pub fn update(&self, id: Uuid, input: UpdateItem) -> KernelResult<Item> {
        let mut item = self
            .inner
            .items
            .get_mut(&id)
            .ok_or(KernelError::NotFound(id))?;

        if let Some(title) = input.title {
            item.title = title;
        }
        if let Some(body) = input.body {
            item.body = body;
        }
        if let Some(status) = input.status {
            item.status = status;
        }
        item.changed = chrono::Utc::now().timestamp();

        info!(item_id = %id, "item updated");
        Ok(item.clone())
    }

    /// Delete an item together with all of its attributes.
    pub fn delete(&self, id: Uuid) -> bool {
        let deleted = self.inner.items.remove(&id).is_some();

        if deleted {
            let attributes = self.inner.meta.detach(id);
            info!(item_id = %id, attributes, "item deleted");
        }

        deleted
    }

    /// List items of a type, oldest first.
    pub fn list_by_type(&self, item_type: &str) -> Vec<Item> {
        let mut items: Vec<_> = self
            .inner
            .items
            .iter()
            .filter(|i| i.is_type(item_type))
            .map(|i| i.clone())
            .collect();
        // UUIDv7 sorts by creation time
        items.sort_by_key(|i| i.id);
        items
    }

    /// Number of stored items.
    pub fn count(&self) -> usize {
        self.inner.items.len()
    }

    /// The attribute storage backing these items.
    pub fn meta(&self) -> &MetaStorage {
        &self.inner.meta
    }
}

impl std::fmt::Debug for ItemService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemService")
            .field("items", &self.count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use marquee_sdk::host::MetaStore;
    use marquee_sdk::types::ContentTypeDefinition;

    fn service() -> ItemService {
        let types = ContentTypeRegistry::new();
        types.register(ContentTypeDefinition::new("movie", "Movie"));
        types.register(ContentTypeDefinition::new("page", "Page"));
        ItemService::new(types, MetaStorage::new())
    }

    #[test]
    fn create_and_load() {
        let service = service();
        let author = Uuid::now_v7();
        let item = service
            .create(NewItem::new("movie", "Inception", author).body("A dream heist."))
            .unwrap();

        let loaded = service.load(item.id).unwrap();
        assert_eq!(loaded, item);
        assert_eq!(loaded.author_id, author);
        assert_eq!(loaded.body, "A dream heist.");
        assert!(!loaded.is_published());
        assert_eq!(loaded.created, loaded.changed);
    }

    #[test]
    fn create_rejects_unknown_type() {
        let service = service();
        let err = service
            .create(NewItem::new("book", "Dune", Uuid::nil()))
            .unwrap_err();
        assert!(matches!(err, KernelError::UnknownContentType(t) if t == "book"));
        assert_eq!(service.count(), 0);
    }

    #[test]
    fn update_changes_only_given_columns() {
        let service = service();
        let item = service
            .create(NewItem::new("page", "About", Uuid::nil()).body("Hi"))
            .unwrap();

        let updated = service
            .update(
                item.id,
                UpdateItem {
                    status: Some(1),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "About");
        assert_eq!(updated.body, "Hi");
        assert!(updated.is_published());
    }

    #[test]
    fn update_missing_item() {
        let service = service();
        let id = Uuid::now_v7();
        assert!(matches!(
            service.update(id, UpdateItem::default()).unwrap_err(),
            KernelError::NotFound(missing) if missing == id
        ));
    }

    #[test]
    fn delete_removes_attributes() {
        let service = service();
        let item = service
            .create(NewItem::new("movie", "Inception", Uuid::nil()))
            .unwrap();
        service
            .meta()
            .set_meta(item.id, "_movie_year", "2010")
            .unwrap();

        assert!(service.delete(item.id));
        assert!(service.load(item.id).is_none());
        assert_eq!(service.meta().count(item.id), 0);
        assert!(!service.delete(item.id));
    }

    #[test]
    fn list_by_type_filters() {
        let service = service();
        let first = service
            .create(NewItem::new("movie", "Inception", Uuid::nil()))
            .unwrap();
        service
            .create(NewItem::new("page", "About", Uuid::nil()))
            .unwrap();
        let second = service
            .create(NewItem::new("movie", "Tenet", Uuid::nil()))
            .unwrap();

        let movies = service.list_by_type("movie");
        assert_eq!(
            movies.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
    }
}
