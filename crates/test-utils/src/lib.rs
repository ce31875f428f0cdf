//! Marquee test utilities.
//!
//! Helpers for integration testing: item and user fixtures, form
//! submission builders, and assertion utilities for rendered HTML.

use std::collections::HashMap;

use marquee_sdk::types::{ADMINISTER_SITE, Item, SaveKind, SaveRequest, UserContext};
use uuid::Uuid;

/// Create a test item with default values.
pub fn test_item(item_type: &str, title: &str) -> TestItem {
    TestItem {
        id: Uuid::now_v7(),
        item_type: item_type.to_string(),
        title: title.to_string(),
        body: String::new(),
        author_id: Uuid::nil(),
        status: 1,
    }
}

/// A test item builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestItem {
    pub id: Uuid,
    pub item_type: String,
    pub title: String,
    pub body: String,
    pub author_id: Uuid,
    pub status: i32,
}

impl TestItem {
    /// Set a custom ID.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author_id: Uuid) -> Self {
        self.author_id = author_id;
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Set as unpublished.
    pub fn unpublished(mut self) -> Self {
        self.status = 0;
        self
    }

    /// Build the SDK item (timestamps fixed at zero).
    pub fn build(self) -> Item {
        Item {
            id: self.id,
            item_type: self.item_type,
            title: self.title,
            body: self.body,
            status: self.status,
            author_id: self.author_id,
            created: 0,
            changed: 0,
        }
    }
}

/// Create an authenticated test user with the given permissions.
pub fn test_user(permissions: &[&str]) -> UserContext {
    UserContext::authenticated(
        Uuid::now_v7(),
        permissions.iter().map(|s| s.to_string()).collect(),
    )
}

/// Create an anonymous test user.
pub fn anonymous_user() -> UserContext {
    UserContext::anonymous()
}

/// Create an admin test user.
pub fn admin_user() -> UserContext {
    test_user(&[ADMINISTER_SITE])
}

/// Start a form submission for an item.
pub fn form_values(item_id: Uuid) -> FormSubmission {
    FormSubmission {
        item_id,
        kind: SaveKind::Explicit,
        values: HashMap::new(),
    }
}

/// Builder for submitted edit forms.
#[derive(Debug, Clone)]
pub struct FormSubmission {
    item_id: Uuid,
    kind: SaveKind,
    values: HashMap<String, String>,
}

impl FormSubmission {
    /// Add a submitted field.
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }

    /// Mark the submission as an autosave.
    pub fn autosave(mut self) -> Self {
        self.kind = SaveKind::Autosave;
        self
    }

    /// Mark the submission as part of a bulk edit.
    pub fn bulk(mut self) -> Self {
        self.kind = SaveKind::Bulk;
        self
    }

    pub fn build(self) -> SaveRequest {
        SaveRequest {
            item_id: self.item_id,
            kind: self.kind,
            values: self.values,
        }
    }
}

/// Pull the `value="..."` attribute of the input named `name` out of
/// rendered HTML.
///
/// Only understands the attribute order the kernel's templates emit
/// (`name` before `value`); good enough for reading back tokens.
pub fn input_value(html: &str, name: &str) -> Option<String> {
    let start = html.find(&format!("name=\"{name}\""))?;
    let rest = &html[start..];
    let value_start = rest.find("value=\"")? + "value=\"".len();
    let value_end = rest[value_start..].find('"')?;
    Some(rest[value_start..value_start + value_end].to_string())
}

/// Assertion helpers for rendered output.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that every needle occurs, in the given order.
    pub fn in_order(haystack: &str, needles: &[&str]) {
        let mut offset = 0;
        for needle in needles {
            match haystack[offset..].find(needle) {
                Some(pos) => offset += pos + needle.len(),
                None => panic!(
                    "Expected '{needle}' after byte {offset}\nActual: {haystack}"
                ),
            }
        }
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_item_builder() {
        let author = Uuid::now_v7();
        let item = test_item("movie", "Inception")
            .with_author(author)
            .with_body("Body")
            .unpublished()
            .build();

        assert_eq!(item.item_type, "movie");
        assert_eq!(item.title, "Inception");
        assert_eq!(item.author_id, author);
        assert!(!item.is_published());
    }

    #[test]
    fn test_user_builder() {
        let user = test_user(&["edit own movie content"]);
        assert!(user.authenticated);
        assert!(user.has_permission("edit own movie content"));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_admin_and_anonymous() {
        assert!(admin_user().is_admin());
        let anon = anonymous_user();
        assert!(!anon.authenticated);
        assert_eq!(anon.id, Uuid::nil());
    }

    #[test]
    fn form_submission_builder() {
        let id = Uuid::now_v7();
        let save = form_values(id).field("movie-year", "2010").bulk().build();
        assert_eq!(save.item_id, id);
        assert_eq!(save.kind, SaveKind::Bulk);
        assert_eq!(save.get("movie-year"), Some("2010"));
    }

    #[test]
    fn input_value_reads_attribute() {
        let html = r#"<input type="hidden" name="movie_nonce" value="abc123"><input name="x" value="y">"#;
        assert_eq!(input_value(html, "movie_nonce").as_deref(), Some("abc123"));
        assert_eq!(input_value(html, "x").as_deref(), Some("y"));
        assert!(input_value(html, "missing").is_none());
    }

    #[test]
    fn test_assertions() {
        assert::contains("hello world", "world");
        assert::not_contains("hello world", "foo");
        assert::in_order("a b c", &["a", "c"]);
    }

    #[test]
    #[should_panic(expected = "Expected 'a'")]
    fn in_order_detects_wrong_order() {
        assert::in_order("a b c", &["c", "a"]);
    }
}
