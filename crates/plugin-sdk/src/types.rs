//! Core types for Marquee plugins.
//!
//! These types are passed between the kernel and plugins on every tap
//! invocation. They are serde-friendly so fixtures and logs can carry them
//! as JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A content item as seen by plugins.
///
/// Structured metadata is not part of the item itself; plugins read and
/// write it through [`MetaStore`](crate::host::MetaStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (UUIDv7, time-sortable).
    pub id: Uuid,

    /// Content type machine name (e.g., "movie", "page").
    pub item_type: String,

    /// Item title.
    pub title: String,

    /// Main body text, rendered after any plugin-provided blocks.
    #[serde(default)]
    pub body: String,

    /// Publication status (0 = unpublished, 1 = published).
    pub status: i32,

    /// Author user ID.
    pub author_id: Uuid,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

impl Item {
    /// Whether this item is of the given content type.
    pub fn is_type(&self, machine_name: &str) -> bool {
        self.item_type == machine_name
    }

    pub fn is_published(&self) -> bool {
        self.status == 1
    }
}

/// A content type definition returned by `tap_item_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeDefinition {
    pub machine_name: String,
    pub label: String,
    pub plural_label: String,
    pub description: String,
    /// URL path segment for the type's public pages (e.g., "movies").
    pub slug: String,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default)]
    pub has_archive: bool,
    pub labels: ContentTypeLabels,
}

fn default_true() -> bool {
    true
}

impl ContentTypeDefinition {
    /// Create a public definition with labels derived from `label`.
    pub fn new(machine_name: &str, label: &str) -> Self {
        Self {
            machine_name: machine_name.into(),
            label: label.into(),
            plural_label: format!("{label}s"),
            description: String::new(),
            slug: machine_name.into(),
            public: true,
            has_archive: false,
            labels: ContentTypeLabels::derive(label, &format!("{label}s")),
        }
    }

    /// Set the plural label (also re-derives the admin labels).
    pub fn plural(mut self, plural: &str) -> Self {
        self.plural_label = plural.into();
        self.labels = ContentTypeLabels::derive(&self.label, plural);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.into();
        self
    }

    pub fn slug(mut self, slug: &str) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_archive(mut self) -> Self {
        self.has_archive = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }
}

/// Admin UI labels for a content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeLabels {
    pub add_new_item: String,
    pub edit_item: String,
    pub new_item: String,
    pub view_item: String,
    pub view_items: String,
    pub search_items: String,
}

impl ContentTypeLabels {
    /// Build the standard label set from singular and plural names.
    pub fn derive(singular: &str, plural: &str) -> Self {
        Self {
            add_new_item: format!("Add New {singular}"),
            edit_item: format!("Edit {singular}"),
            new_item: format!("New {singular}"),
            view_item: format!("View {singular}"),
            view_items: format!("View {plural}"),
            search_items: format!("Search {plural}"),
        }
    }
}

/// Permission definition returned by `tap_perm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    pub name: String,
    pub description: String,
}

impl PermissionDefinition {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// The permission that grants every other permission.
pub const ADMINISTER_SITE: &str = "administer site";

/// User context for the current request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    /// User ID (Uuid::nil() for anonymous).
    pub id: Uuid,
    /// Whether the user is authenticated.
    pub authenticated: bool,
    /// Resolved permissions for the user.
    pub permissions: Vec<String>,
}

impl UserContext {
    /// Create context for anonymous user.
    pub fn anonymous() -> Self {
        Self {
            id: Uuid::nil(),
            authenticated: false,
            permissions: Vec::new(),
        }
    }

    /// Create context for authenticated user.
    pub fn authenticated(id: Uuid, permissions: Vec<String>) -> Self {
        Self {
            id,
            authenticated: true,
            permissions,
        }
    }

    /// Check if user has a specific permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_admin() || self.permissions.iter().any(|p| p == permission)
    }

    /// Check if user is admin.
    pub fn is_admin(&self) -> bool {
        self.permissions.iter().any(|p| p == ADMINISTER_SITE)
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// How a save was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveKind {
    /// The user pressed save on the edit screen.
    #[default]
    Explicit,
    /// Periodic background save of an open editor.
    Autosave,
    /// Part of a bulk edit over many items.
    Bulk,
}

impl SaveKind {
    /// Background saves never carry a complete, user-confirmed form.
    pub fn is_background(self) -> bool {
        !matches!(self, SaveKind::Explicit)
    }
}

/// A submitted save for one item.
///
/// `values` holds the raw submitted form fields; keys are unique and
/// their order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub item_id: Uuid,
    #[serde(default)]
    pub kind: SaveKind,
    #[serde(default)]
    pub values: HashMap<String, String>,
}

impl SaveRequest {
    pub fn new(item_id: Uuid) -> Self {
        Self {
            item_id,
            kind: SaveKind::Explicit,
            values: HashMap::new(),
        }
    }

    pub fn kind(mut self, kind: SaveKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a submitted field.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Raw submitted value for a field, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_user_context() {
        let ctx = UserContext::anonymous();
        assert_eq!(ctx.id, Uuid::nil());
        assert!(!ctx.authenticated);
        assert!(!ctx.has_permission("edit any movie content"));
    }

    #[test]
    fn admin_has_every_permission() {
        let ctx = UserContext::authenticated(Uuid::now_v7(), vec![ADMINISTER_SITE.into()]);
        assert!(ctx.is_admin());
        assert!(ctx.has_permission("anything at all"));
    }

    #[test]
    fn content_type_labels_follow_plural() {
        let def = ContentTypeDefinition::new("movie", "Movie")
            .plural("Movies")
            .slug("movies")
            .with_archive();

        assert_eq!(def.labels.add_new_item, "Add New Movie");
        assert_eq!(def.labels.view_items, "View Movies");
        assert_eq!(def.labels.search_items, "Search Movies");
        assert!(def.public);
        assert!(def.has_archive);
    }

    #[test]
    fn save_kind_background() {
        assert!(!SaveKind::Explicit.is_background());
        assert!(SaveKind::Autosave.is_background());
        assert!(SaveKind::Bulk.is_background());
    }

    #[test]
    fn save_request_deserializes_with_defaults() {
        let id = Uuid::now_v7();
        let json = serde_json::json!({ "item_id": id, "values": { "a": "1" } });
        let save: SaveRequest = serde_json::from_value(json).unwrap();

        assert_eq!(save.kind, SaveKind::Explicit);
        assert_eq!(save.get("a"), Some("1"));
        assert_eq!(save.get("b"), None);
    }
}
