//! Text filter pipelines.
//!
//! Two families of pipelines live here:
//! - output formats (`plain_text`): escape stored text for display
//! - input sanitizers (`sanitize_text`, `sanitize_textarea`): coerce
//!   untrusted submissions to plain text before they are stored

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use marquee_sdk::host::TextSanitizer;

/// Sanitizer that allows no tags at all; script and style lose their content too.
static TAG_STRIPPER: LazyLock<ammonia::Builder<'static>> = LazyLock::new(|| {
    let mut builder = ammonia::Builder::empty();
    builder
        .clean_content_tags(HashSet::from(["script", "style"]))
        .strip_comments(true);
    builder
});

#[allow(clippy::expect_used)]
static PERCENT_OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("valid regex literal"));

#[allow(clippy::expect_used)]
static INLINE_WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t ]+").expect("valid regex literal"));

/// Trait for text filters in the pipeline.
pub trait TextFilter: Send + Sync {
    /// Filter name for debugging.
    fn name(&self) -> &str;

    /// Process the input text and return filtered output.
    fn process(&self, input: &str) -> String;
}

/// Pipeline of text filters applied in sequence.
pub struct FilterPipeline {
    filters: Vec<Box<dyn TextFilter>>,
}

impl FilterPipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline.
    pub fn add<F: TextFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Create pipeline for an output format.
    pub fn for_format(format: &str) -> Self {
        match format {
            "plain_text" => Self::plain_text(),
            _ => Self::plain_text(), // Default to safest option
        }
    }

    /// Create a plain text pipeline (escapes all HTML).
    pub fn plain_text() -> Self {
        Self::new().add(HtmlEscapeFilter).add(NewlineFilter)
    }

    /// Single-line input sanitizer: no markup, no control characters,
    /// no line breaks, collapsed whitespace.
    pub fn sanitize_text() -> Self {
        Self::new()
            .add(StripTagsFilter)
            .add(ControlCharFilter { keep_newlines: false })
            .add(PercentOctetFilter)
            .add(WhitespaceFilter { keep_newlines: false })
    }

    /// Multi-line input sanitizer: like `sanitize_text` but line breaks survive.
    pub fn sanitize_textarea() -> Self {
        Self::new()
            .add(StripTagsFilter)
            .add(ControlCharFilter { keep_newlines: true })
            .add(PercentOctetFilter)
            .add(WhitespaceFilter { keep_newlines: true })
    }

    /// Process text through all filters in the pipeline.
    pub fn process(&self, input: &str) -> String {
        self.filters
            .iter()
            .fold(input.to_string(), |acc, filter| filter.process(&acc))
    }

    /// Names of the filters in order (for debugging).
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::plain_text()
    }
}

/// Filter that escapes all HTML characters.
pub struct HtmlEscapeFilter;

impl TextFilter for HtmlEscapeFilter {
    fn name(&self) -> &str {
        "html_escape"
    }

    fn process(&self, input: &str) -> String {
        html_escape(input)
    }
}

/// Escape the five HTML-significant characters.
pub fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Filter that converts newlines to <br> tags.
pub struct NewlineFilter;

impl TextFilter for NewlineFilter {
    fn name(&self) -> &str {
        "newline"
    }

    fn process(&self, input: &str) -> String {
        input.replace("\r\n", "\n").replace('\n', "<br>\n")
    }
}

/// Filter that removes every tag, plus script/style blocks with their content.
///
/// Input is parsed as HTML, so a tag left open at the end of the input is
/// dropped as well. A `<` that does not open a tag (as in "a < b") is kept,
/// and entities come back as plain characters.
pub struct StripTagsFilter;

impl TextFilter for StripTagsFilter {
    fn name(&self) -> &str {
        "strip_tags"
    }

    fn process(&self, input: &str) -> String {
        if !input.contains(['<', '&']) {
            return input.to_string();
        }
        let cleaned = TAG_STRIPPER.clean(input).to_string();
        unescape_text(&cleaned)
    }
}

/// Undo the escaping the HTML serializer applies to text nodes.
fn unescape_text(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

/// Filter that drops control characters.
///
/// Tabs always become spaces; line breaks are kept only in multi-line mode.
pub struct ControlCharFilter {
    pub keep_newlines: bool,
}

impl TextFilter for ControlCharFilter {
    fn name(&self) -> &str {
        "control_chars"
    }

    fn process(&self, input: &str) -> String {
        input
            .replace("\r\n", "\n")
            .chars()
            .filter_map(|c| match c {
                '\n' | '\r' if self.keep_newlines => Some('\n'),
                '\n' | '\r' | '\t' => Some(' '),
                c if c.is_control() => None,
                c => Some(c),
            })
            .collect()
    }
}

/// Filter that removes percent-encoded octets (e.g. "%3C").
pub struct PercentOctetFilter;

impl TextFilter for PercentOctetFilter {
    fn name(&self) -> &str {
        "percent_octets"
    }

    fn process(&self, input: &str) -> String {
        let mut current = input.to_string();
        // Removing one octet can join "%" with two hex digits into a new one
        while PERCENT_OCTET.is_match(&current) {
            current = PERCENT_OCTET.replace_all(&current, "").into_owned();
        }
        current
    }
}

/// Filter that collapses whitespace runs and trims.
pub struct WhitespaceFilter {
    pub keep_newlines: bool,
}

impl TextFilter for WhitespaceFilter {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn process(&self, input: &str) -> String {
        if self.keep_newlines {
            input
                .lines()
                .map(|line| INLINE_WHITESPACE_RUN.replace_all(line, " ").trim().to_string())
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        } else {
            WHITESPACE_RUN.replace_all(input, " ").trim().to_string()
        }
    }
}

/// The kernel's [`TextSanitizer`] for plugins.
pub struct PlainTextSanitizer {
    single_line: FilterPipeline,
    multi_line: FilterPipeline,
}

impl PlainTextSanitizer {
    pub fn new() -> Self {
        Self {
            single_line: FilterPipeline::sanitize_text(),
            multi_line: FilterPipeline::sanitize_textarea(),
        }
    }
}

impl Default for PlainTextSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSanitizer for PlainTextSanitizer {
    fn plain_text(&self, raw: &str) -> String {
        self.single_line.process(raw)
    }

    fn plain_textarea(&self, raw: &str) -> String {
        self.multi_line.process(raw)
    }
}
