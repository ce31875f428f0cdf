//! Render element builder API.
//!
//! Plugins return structured render elements (never raw HTML).
//! The Kernel escapes and renders these through its theme.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A render element in the render tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderElement {
    #[serde(rename = "#type")]
    pub element_type: String,
    #[serde(rename = "#weight", skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    #[serde(rename = "#tag", skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(rename = "#title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "#value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "#format", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "#attributes", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(flatten)]
    pub children: BTreeMap<String, RenderElement>,
}

impl RenderElement {
    /// Look up a string attribute (e.g., "name", "id").
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.as_ref()?.get(key)?.as_str()
    }

    /// Depth-first search for the first descendant (or self) with a `name` attribute.
    pub fn find_named(&self, name: &str) -> Option<&RenderElement> {
        if self.attr("name") == Some(name) {
            return Some(self);
        }
        self.children.values().find_map(|c| c.find_named(name))
    }
}

/// Builder for constructing render elements.
pub struct ElementBuilder {
    element_type: String,
    weight: Option<i32>,
    tag: Option<String>,
    title: Option<String>,
    value: Option<String>,
    format: Option<String>,
    classes: Vec<String>,
    attrs: serde_json::Map<String, Value>,
    children: BTreeMap<String, RenderElement>,
}

impl ElementBuilder {
    fn new(element_type: &str) -> Self {
        Self {
            element_type: element_type.into(),
            weight: None,
            tag: None,
            title: None,
            value: None,
            format: None,
            classes: Vec::new(),
            attrs: serde_json::Map::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn weight(mut self, w: i32) -> Self {
        self.weight = Some(w);
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.into(), Value::String(value.into()));
        self
    }

    pub fn child(mut self, key: &str, element: RenderElement) -> Self {
        self.children.insert(key.into(), element);
        self
    }

    pub fn build(self) -> RenderElement {
        let attributes = if self.classes.is_empty() && self.attrs.is_empty() {
            None
        } else {
            let mut map = self.attrs;
            if !self.classes.is_empty() {
                map.insert(
                    "class".into(),
                    Value::Array(self.classes.into_iter().map(Value::String).collect()),
                );
            }
            Some(Value::Object(map))
        };

        RenderElement {
            element_type: self.element_type,
            weight: self.weight,
            tag: self.tag,
            title: self.title,
            value: self.value,
            format: self.format,
            attributes,
            children: self.children,
        }
    }
}

/// Create a container element (groups children).
pub fn container() -> ElementBuilder {
    ElementBuilder::new("container")
}

/// Create a markup element with an HTML tag and plain-text value.
pub fn markup(tag: &str, value: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new("markup");
    b.tag = Some(tag.into());
    b.value = Some(value.into());
    b.format = Some("plain_text".into());
    b
}

fn form_control(element_type: &str, name: &str, title: &str, value: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new(element_type);
    b.title = Some(title.into());
    b.value = Some(value.into());
    b.attr("name", name).attr("id", name)
}

/// Create a labelled single-line text input.
pub fn textfield(name: &str, title: &str, value: &str) -> ElementBuilder {
    form_control("textfield", name, title, value).attr("type", "text")
}

/// Create a labelled numeric input.
pub fn number(name: &str, title: &str, value: &str) -> ElementBuilder {
    form_control("textfield", name, title, value).attr("type", "number")
}

/// Create a labelled multi-line text input.
pub fn textarea(name: &str, title: &str, value: &str) -> ElementBuilder {
    form_control("textarea", name, title, value)
}

/// Create a hidden input.
pub fn hidden(name: &str, value: &str) -> ElementBuilder {
    let mut b = ElementBuilder::new("hidden");
    b.value = Some(value.into());
    b.attr("name", name)
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn markup_is_plain_text() {
        let el = markup("h5", "Heading").class("title").build();
        assert_eq!(el.element_type, "markup");
        assert_eq!(el.tag.as_deref(), Some("h5"));
        assert_eq!(el.format.as_deref(), Some("plain_text"));
        assert_eq!(el.attributes.unwrap()["class"][0], "title");
    }

    #[test]
    fn form_controls_carry_name_and_title() {
        let el = number("movie-year", "Year", "2010").weight(2).build();
        assert_eq!(el.element_type, "textfield");
        assert_eq!(el.attr("name"), Some("movie-year"));
        assert_eq!(el.attr("id"), Some("movie-year"));
        assert_eq!(el.attr("type"), Some("number"));
        assert_eq!(el.title.as_deref(), Some("Year"));
        assert_eq!(el.value.as_deref(), Some("2010"));
    }

    #[test]
    fn find_named_descends_into_children() {
        let tree = container()
            .child("token", hidden("nonce", "abc").build())
            .child(
                "group",
                container().child("plot", textarea("plot", "Plot", "").build()).build(),
            )
            .build();

        assert_eq!(tree.find_named("nonce").unwrap().value.as_deref(), Some("abc"));
        assert_eq!(tree.find_named("plot").unwrap().element_type, "textarea");
        assert!(tree.find_named("missing").is_none());
    }

    #[test]
    fn serializes_with_hash_keys() {
        let el = hidden("nonce", "abc").build();
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["#type"], "hidden");
        assert_eq!(json["#value"], "abc");
        assert!(json.get("#title").is_none());
    }
}
