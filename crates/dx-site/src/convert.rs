//! Document formats and markup conversion.

use std::path::Path;
use std::sync::LazyLock;

use dx_cache::Converter;
use pulldown_cmark::{Event, Options, Parser, TagEnd};
use regex::Regex;

static SCRIPT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(?:script|style)\s*>")
        .expect("invalid script regex")
});
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"));

/// Source format of a document, decided by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Markdown, converted to HTML on request.
    Markdown,
    /// HTML, served as is.
    Html,
}

impl DocumentFormat {
    /// Format of the document at `path`.
    #[must_use]
    pub fn of(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        match ext.as_deref() {
            Some("html" | "htm") => Self::Html,
            _ => Self::Markdown,
        }
    }
}

/// Markdown to HTML converter with GitHub Flavored Markdown extensions.
#[derive(Clone, Copy, Debug)]
pub struct MarkdownConverter {
    options: Options,
}

impl MarkdownConverter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM,
        }
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for MarkdownConverter {
    fn to_markup(&self, raw: &str) -> String {
        let mut html = String::with_capacity(raw.len() + raw.len() / 2);
        pulldown_cmark::html::push_html(&mut html, Parser::new_ext(raw, self.options));
        html
    }
}

/// Searchable plain text of a document with whitespace collapsed.
#[must_use]
pub fn plain_text(format: DocumentFormat, raw: &str) -> String {
    let text = match format {
        DocumentFormat::Markdown => markdown_text(raw),
        DocumentFormat::Html => html_text(raw),
    };
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn markdown_text(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    for event in Parser::new_ext(raw, MarkdownConverter::new().options) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak
            | Event::HardBreak
            | Event::Rule
            | Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell,
            ) => text.push(' '),
            _ => {}
        }
    }
    text
}

fn html_text(raw: &str) -> String {
    let without_scripts = SCRIPT_PATTERN.replace_all(raw, " ");
    TAG_PATTERN
        .replace_all(&without_scripts, " ")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
