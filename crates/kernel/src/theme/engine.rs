//! Theme engine with Tera templates.

use std::path::Path;

use anyhow::{Context, Result};
use tera::Tera;
use tracing::debug;

use super::render::RenderTreeConsumer;
use crate::content::FilterPipeline;
use marquee_sdk::render::RenderElement;

/// Built-in templates for form controls. Names end in `.html` so Tera
/// autoescapes every interpolated value.
const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    (
        "elements/textfield.html",
        r#"<div class="form-item form-item--{{ input_type }}{% if class %} {{ class }}{% endif %}"><label for="{{ id }}">{{ title }}</label><input type="{{ input_type }}" id="{{ id }}" name="{{ name }}" value="{{ value }}"></div>"#,
    ),
    (
        "elements/textarea.html",
        r#"<div class="form-item form-item--textarea{% if class %} {{ class }}{% endif %}"><label for="{{ id }}">{{ title }}</label><textarea id="{{ id }}" name="{{ name }}" rows="5">{{ value }}</textarea></div>"#,
    ),
    (
        "elements/hidden.html",
        r#"<input type="hidden" name="{{ name }}" value="{{ value }}">"#,
    ),
];

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    /// Tera template engine instance.
    tera: Tera,
    /// Render tree consumer for RenderElement → HTML.
    render_consumer: RenderTreeConsumer,
}

impl ThemeEngine {
    /// Create a theme engine with the built-in element templates.
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        Self::register_filters(&mut tera);
        tera.add_raw_templates(DEFAULT_TEMPLATES.iter().copied())
            .context("failed to register built-in templates")?;

        Ok(Self {
            tera,
            render_consumer: RenderTreeConsumer::new(),
        })
    }

    /// Create a theme engine whose templates in `template_dir` override the
    /// built-in ones.
    pub fn with_overrides(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;
        debug!(
            count = tera.get_template_names().count(),
            dir = %template_dir.display(),
            "loaded template overrides"
        );

        // `extend` only adds names the directory did not define
        let defaults = Self::new()?;
        tera.extend(&defaults.tera)
            .context("failed to merge built-in templates")?;
        Self::register_filters(&mut tera);

        Ok(Self {
            tera,
            render_consumer: RenderTreeConsumer::new(),
        })
    }

    /// Create a theme engine with no templates (everything renders inline).
    pub fn empty() -> Self {
        Self {
            tera: Tera::default(),
            render_consumer: RenderTreeConsumer::new(),
        }
    }

    /// Register custom Tera filters.
    fn register_filters(tera: &mut Tera) {
        // Filter for text format processing
        tera.register_filter(
            "text_format",
            |value: &tera::Value, args: &std::collections::HashMap<String, tera::Value>| {
                let text = tera::try_get_value!("text_format", "value", String, value);
                let format = args
                    .get("format")
                    .and_then(|v| v.as_str())
                    .unwrap_or("plain_text");

                let pipeline = FilterPipeline::for_format(format);
                Ok(tera::Value::String(pipeline.process(&text)))
            },
        );
    }

    /// Get the underlying Tera instance for custom operations.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Render a RenderElement tree to HTML.
    pub fn render_element(&self, element: &RenderElement) -> Result<String> {
        self.render_consumer
            .render(&self.tera, element, &tera::Context::new())
    }

    /// Render several trees in order and concatenate the HTML.
    pub fn render_all<'a>(
        &self,
        elements: impl IntoIterator<Item = &'a RenderElement>,
    ) -> Result<String> {
        let mut html = String::new();
        for element in elements {
            html.push_str(&self.render_element(element)?);
        }
        Ok(html)
    }
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("template_count", &self.tera.get_template_names().count())
            .finish()
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use marquee_sdk::render;

    #[test]
    fn textfield_template_escapes_value() {
        let engine = ThemeEngine::new().unwrap();
        let html = engine
            .render_element(&render::textfield("movie-director", "Director", "\"Nolan\" <C>").build())
            .unwrap();

        assert_eq!(
            html,
            "<div class=\"form-item form-item--text\"><label for=\"movie-director\">Director</label><input type=\"text\" id=\"movie-director\" name=\"movie-director\" value=\"&quot;Nolan&quot; &lt;C&gt;\"></div>"
        );
    }

    #[test]
    fn number_input_type() {
        let engine = ThemeEngine::new().unwrap();
        let html = engine
            .render_element(&render::number("movie-year", "Year", "2010").build())
            .unwrap();
        assert!(html.contains("type=\"number\""));
        assert!(html.contains("value=\"2010\""));
    }

    #[test]
    fn textarea_template_prefills_content() {
        let engine = ThemeEngine::new().unwrap();
        let html = engine
            .render_element(&render::textarea("movie-plot", "Plot", "Line one\nLine two").build())
            .unwrap();
        assert!(html.contains(">Line one\nLine two</textarea>"));
        assert!(html.contains("<label for=\"movie-plot\">Plot</label>"));
    }

    #[test]
    fn empty_engine_renders_inline() {
        let engine = ThemeEngine::empty();
        let html = engine
            .render_element(&render::markup("h5", "Movie information").build())
            .unwrap();
        assert_eq!(html, "<h5>Movie information</h5>");
    }

    #[test]
    fn render_all_concatenates() {
        let engine = ThemeEngine::new().unwrap();
        let a = render::markup("p", "a").build();
        let b = render::markup("p", "b").build();
        assert_eq!(engine.render_all([&a, &b]).unwrap(), "<p>a</p><p>b</p>");
    }

    #[test]
    fn overrides_replace_built_ins() {
        let dir = std::env::temp_dir().join(format!("marquee-theme-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(dir.join("elements")).unwrap();
        std::fs::write(
            dir.join("elements/hidden.html"),
            "<input type=\"hidden\" data-x name=\"{{ name }}\" value=\"{{ value }}\">",
        )
        .unwrap();

        let engine = ThemeEngine::with_overrides(&dir).unwrap();
        let hidden = engine
            .render_element(&render::hidden("t", "v").build())
            .unwrap();
        let text = engine
            .render_element(&render::textfield("n", "N", "v").build())
            .unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(hidden, "<input type=\"hidden\" data-x name=\"t\" value=\"v\">");
        assert!(text.starts_with("<div class=\"form-item form-item--text\">"));
    }

    #[test]
    fn text_format_filter() {
        let engine = ThemeEngine::new().unwrap();
        let mut tera = engine.tera().clone();
        tera.add_raw_template("t", "{{ v | text_format | safe }}").unwrap();
        let mut ctx = tera::Context::new();
        ctx.insert("v", "a<b\nc");
        assert_eq!(tera.render("t", &ctx).unwrap(), "a&lt;b<br>\nc");
    }
}
