//! The movie attribute schema.
//!
//! One static table drives the edit form, the save handler and the summary
//! block, so the three always agree on names, keys and order.

use marquee_sdk::host::TextSanitizer;
use marquee_sdk::render::{self, ElementBuilder};

/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Text,
    Number,
    /// Multi-line; line breaks survive sanitization.
    Textarea,
}

impl Widget {
    /// Form control for this widget, pre-filled with `value`.
    pub fn element(self, name: &str, label: &str, value: &str) -> ElementBuilder {
        match self {
            Widget::Text => render::textfield(name, label, value),
            Widget::Number => render::number(name, label, value),
            Widget::Textarea => render::textarea(name, label, value),
        }
    }

    /// Coerce a submitted value to plain text.
    pub fn sanitize(self, text: &dyn TextSanitizer, raw: &str) -> String {
        match self {
            Widget::Text | Widget::Number => text.plain_text(raw),
            Widget::Textarea => text.plain_textarea(raw),
        }
    }
}

/// One movie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieField {
    /// Submitted form field name.
    pub name: &'static str,
    /// Attribute key in item storage.
    pub meta_key: &'static str,
    /// Label on the edit form.
    pub label: &'static str,
    /// Label in the rendered summary.
    pub summary_label: &'static str,
    pub widget: Widget,
}

/// Every movie attribute, in display order.
pub const FIELDS: &[MovieField] = &[
    MovieField {
        name: "movie-full-title",
        meta_key: "_movie_full_title",
        label: "Full title",
        summary_label: "Movie title",
        widget: Widget::Text,
    },
    MovieField {
        name: "movie-director",
        meta_key: "_movie_director",
        label: "Director",
        summary_label: "Movie director",
        widget: Widget::Text,
    },
    MovieField {
        name: "movie-year",
        meta_key: "_movie_year",
        label: "Year",
        summary_label: "Movie year",
        widget: Widget::Number,
    },
    MovieField {
        name: "movie-runtime",
        meta_key: "_movie_runtime",
        label: "Runtime",
        summary_label: "Movie runtime",
        widget: Widget::Text,
    },
    MovieField {
        name: "movie-main-roles",
        meta_key: "_movie_main_roles",
        label: "In main roles",
        summary_label: "Movie main roles",
        widget: Widget::Text,
    },
    MovieField {
        name: "movie-plot",
        meta_key: "_movie_plot",
        label: "Plot",
        summary_label: "Movie plot",
        widget: Widget::Textarea,
    },
];
