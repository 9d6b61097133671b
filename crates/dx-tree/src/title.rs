//! Document title extraction.

use std::sync::LazyLock;

use regex::Regex;

static MARKDOWN_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ {0,3}#{1,6}[ \t]+(.+?)[ \t#]*$").expect("invalid markdown heading regex")
});
static HTML_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(h[1-6]|title)(?:\s[^>]*)?>(.*?)</(?:h[1-6]|title)\s*>")
        .expect("invalid html heading regex")
});
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"));

/// Derives a display title from raw document text.
pub trait TitleExtractor: Send + Sync {
    /// Return the document title, or `fallback` when none can be found.
    fn extract_title(&self, raw: &str, fallback: &str) -> String;
}

/// Title extractor using the first heading in the document.
///
/// Recognizes markdown ATX headings (`# Title`, any level) and HTML heading
/// or `<title>` elements, whichever appears first.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadingTitleExtractor;

impl HeadingTitleExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn first_markdown(raw: &str) -> Option<(usize, String)> {
        MARKDOWN_HEADING.captures_iter(raw).find_map(|caps| {
            let text = caps[1].trim();
            (!text.is_empty()).then(|| (caps.get(0).map_or(0, |m| m.start()), text.to_owned()))
        })
    }

    fn first_html(raw: &str) -> Option<(usize, String)> {
        HTML_HEADING.captures_iter(raw).find_map(|caps| {
            let text = TAG_PATTERN.replace_all(&caps[2], "");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then(|| (caps.get(0).map_or(0, |m| m.start()), text))
        })
    }
}

impl TitleExtractor for HeadingTitleExtractor {
    fn extract_title(&self, raw: &str, fallback: &str) -> String {
        let found = match (Self::first_markdown(raw), Self::first_html(raw)) {
            (Some(md), Some(html)) => Some(if html.0 < md.0 { html } else { md }),
            (md, html) => md.or(html),
        };
        found.map_or_else(|| fallback.to_owned(), |(_, title)| title)
    }
}
