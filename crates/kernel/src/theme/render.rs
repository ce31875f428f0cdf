//! Render tree consumer - converts RenderElement trees to HTML via Tera.
//!
//! Element types with a template (`elements/{type}.html`) are rendered by
//! Tera with autoescaping, so their values are passed through raw.
//! Everything else falls back to inline rendering, where values go through
//! the element's [`FilterPipeline`].

use anyhow::{Context, Result};
use serde_json::Value;
use tera::{Context as TeraContext, Tera};

use crate::content::{FilterPipeline, html_escape};
use marquee_sdk::render::RenderElement;

/// Tags rendered without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

/// Consumer that converts RenderElement trees to HTML.
#[derive(Debug, Default)]
pub struct RenderTreeConsumer {
    _private: (),
}

impl RenderTreeConsumer {
    /// Create a new render tree consumer.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Render a RenderElement tree to HTML.
    pub fn render(
        &self,
        tera: &Tera,
        element: &RenderElement,
        context: &TeraContext,
    ) -> Result<String> {
        self.render_element(tera, element, context)
    }

    /// Render a single element and its children.
    fn render_element(
        &self,
        tera: &Tera,
        element: &RenderElement,
        context: &TeraContext,
    ) -> Result<String> {
        let children_html = self.render_children(tera, element, context)?;

        let template_name = self.template_for_type(&element.element_type);
        if tera.get_template(&template_name).is_err() {
            return Ok(self.render_inline(element, &children_html));
        }

        let mut el_context = context.clone();
        el_context.insert("element", element);
        el_context.insert("children", &children_html);

        // Templates reference these unconditionally
        el_context.insert("name", element.attr("name").unwrap_or_default());
        el_context.insert("id", element.attr("id").unwrap_or_default());
        el_context.insert("input_type", element.attr("type").unwrap_or("text"));
        el_context.insert("title", element.title.as_deref().unwrap_or_default());
        el_context.insert("value", element.value.as_deref().unwrap_or_default());
        el_context.insert("class", &self.get_class_string(element));

        tera.render(&template_name, &el_context)
            .with_context(|| format!("failed to render element type: {}", element.element_type))
    }

    /// Render element children, sorted by weight.
    ///
    /// Children with equal weight keep their key order.
    fn render_children(
        &self,
        tera: &Tera,
        element: &RenderElement,
        context: &TeraContext,
    ) -> Result<String> {
        if element.children.is_empty() {
            return Ok(String::new());
        }

        let mut children: Vec<_> = element.children.iter().collect();
        children.sort_by_key(|(_, child)| child.weight.unwrap_or(0));

        let mut html = String::new();
        for (_key, child) in children {
            html.push_str(&self.render_element(tera, child, context)?);
        }

        Ok(html)
    }

    /// Process a value through the appropriate filter pipeline.
    fn process_value(&self, value: &str, format: Option<&str>) -> String {
        let format_name = format.unwrap_or("plain_text");
        FilterPipeline::for_format(format_name).process(value)
    }

    /// Convert a classes value (array or string) to a space-separated string.
    fn classes_to_string(&self, classes: &Value) -> String {
        match classes {
            Value::Array(arr) => arr
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            Value::String(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn template_for_type(&self, element_type: &str) -> String {
        format!("elements/{element_type}.html")
    }

    /// Render an element inline when no template is available.
    fn render_inline(&self, element: &RenderElement, children: &str) -> String {
        match element.element_type.as_str() {
            "container" => self.render_container(element, children),
            "markup" => self.render_markup(element),
            other => {
                // Unknown type - wrap in a div
                let class = self.get_class_string(element);
                format!(
                    "<div class=\"element element--{}{}\">{}</div>",
                    html_escape(other),
                    prefixed(&html_escape(&class)),
                    children
                )
            }
        }
    }

    fn render_container(&self, element: &RenderElement, children: &str) -> String {
        let class = self.get_class_string(element);
        let attrs = self.get_extra_attrs(element);

        format!(
            "<div class=\"container{}\"{}>{}</div>",
            prefixed(&html_escape(&class)),
            attrs,
            children
        )
    }

    fn render_markup(&self, element: &RenderElement) -> String {
        let tag = element
            .tag
            .as_deref()
            .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("span");
        let value = element
            .value
            .as_ref()
            .map(|v| self.process_value(v, element.format.as_deref()))
            .unwrap_or_default();

        let class = self.get_class_string(element);
        let class_attr = if class.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", html_escape(&class))
        };
        let attrs = self.get_extra_attrs(element);

        if VOID_ELEMENTS.contains(&tag) {
            return format!("<{tag}{class_attr}{attrs} />");
        }

        format!("<{tag}{class_attr}{attrs}>{value}</{tag}>")
    }

    /// Get class string from element attributes.
    fn get_class_string(&self, element: &RenderElement) -> String {
        element
            .attributes
            .as_ref()
            .and_then(|attrs| attrs.get("class"))
            .map(|classes| self.classes_to_string(classes))
            .unwrap_or_default()
    }

    /// Get extra attributes (excluding class) as a string.
    fn get_extra_attrs(&self, element: &RenderElement) -> String {
        let Some(Value::Object(obj)) = &element.attributes else {
            return String::new();
        };

        obj.iter()
            .filter(|(k, _)| *k != "class")
            .map(|(k, v)| match v {
                Value::Bool(true) => format!(" {}", html_escape(k)),
                Value::Bool(false) => String::new(),
                Value::String(s) => format!(" {}=\"{}\"", html_escape(k), html_escape(s)),
                other => format!(" {}=\"{}\"", html_escape(k), html_escape(&other.to_string())),
            })
            .collect()
    }
}

/// `" {s}"`, or nothing for an empty string.
fn prefixed(s: &str) -> String {
    if s.is_empty() {
        String::new()
    } else {
        format!(" {s}")
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use marquee_sdk::render;

    #[test]
    fn render_markup_basic() {
        let consumer = RenderTreeConsumer::new();
        let element = render::markup("p", "Hello world").build();
        assert_eq!(consumer.render_markup(&element), "<p>Hello world</p>");
    }

    #[test]
    fn render_markup_with_class() {
        let consumer = RenderTreeConsumer::new();
        let element = render::markup("span", "Test").class("text").build();
        assert_eq!(
            consumer.render_markup(&element),
            "<span class=\"text\">Test</span>"
        );
    }

    #[test]
    fn render_markup_escapes_value() {
        let consumer = RenderTreeConsumer::new();
        let element = render::markup("div", "<b>bold</b> & more").build();
        assert_eq!(
            consumer.render_markup(&element),
            "<div>&lt;b&gt;bold&lt;/b&gt; &amp; more</div>"
        );
    }

    #[test]
    fn render_markup_rejects_odd_tags() {
        let consumer = RenderTreeConsumer::new();
        let element = render::markup("script src=x", "hi").build();
        assert_eq!(consumer.render_markup(&element), "<span>hi</span>");
    }

    #[test]
    fn render_container() {
        let consumer = RenderTreeConsumer::new();
        let element = render::container().class("movie-info").build();
        assert_eq!(
            consumer.render_container(&element, "<p>Child</p>"),
            "<div class=\"container movie-info\"><p>Child</p></div>"
        );
    }

    #[test]
    fn children_sorted_by_weight() {
        let consumer = RenderTreeConsumer::new();
        let tree = render::container()
            .child("a", render::markup("p", "second").weight(1).build())
            .child("b", render::markup("p", "first").weight(0).build())
            .build();

        let html = consumer
            .render(&Tera::default(), &tree, &TeraContext::new())
            .unwrap();
        assert_eq!(
            html,
            "<div class=\"container\"><p>first</p><p>second</p></div>"
        );
    }

    #[test]
    fn template_used_when_present() {
        let mut tera = Tera::default();
        tera.add_raw_template("elements/hidden.html", "<input name=\"{{ name }}\" value=\"{{ value }}\">")
            .unwrap();

        let consumer = RenderTreeConsumer::new();
        let html = consumer
            .render(
                &tera,
                &render::hidden("token", "a\"b").build(),
                &TeraContext::new(),
            )
            .unwrap();
        assert_eq!(html, "<input name=\"token\" value=\"a&quot;b\">");
    }

    #[test]
    fn process_value_plain_text() {
        let consumer = RenderTreeConsumer::new();
        let result = consumer.process_value("<script>alert('xss')</script>", Some("plain_text"));
        assert!(!result.contains("<script>"));
        assert!(result.contains("&lt;script&gt;"));
    }

    #[test]
    fn classes_to_string_variants() {
        let consumer = RenderTreeConsumer::new();
        let classes = Value::Array(vec![
            Value::String("foo".to_string()),
            Value::String("bar".to_string()),
        ]);
        assert_eq!(consumer.classes_to_string(&classes), "foo bar");
        assert_eq!(
            consumer.classes_to_string(&Value::String("foo bar".into())),
            "foo bar"
        );
        assert_eq!(consumer.classes_to_string(&Value::Null), "");
    }
}
