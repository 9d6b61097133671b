//! In-memory search index.

use serde::Serialize;

use crate::document::SearchDocument;
use crate::fold::{char_offset, fold};

const SNIPPET_SEPARATOR: &str = " ... ";

/// Query tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of matches a full-text snippet covers.
    pub match_depth: usize,
    /// Characters per snippet window.
    pub match_width: usize,
    /// Maximum hits returned per query.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            match_depth: 2,
            match_width: 120,
            max_results: 20,
        }
    }
}

/// Title search result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TitleHit {
    pub path: String,
    pub title: String,
}

/// Full-text search result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FullHit {
    pub path: String,
    pub title: String,
    /// Excerpt around the first matches.
    pub snippet: String,
    /// Number of non-overlapping occurrences in the body.
    pub matches: usize,
}

/// Immutable search index over a document set.
#[derive(Clone, Debug)]
pub struct SearchIndex {
    config: SearchConfig,
    documents: Vec<SearchDocument>,
    titles: Vec<String>,
    bodies: Vec<String>,
}

impl SearchIndex {
    /// Index with no documents.
    #[must_use]
    pub fn empty(config: SearchConfig) -> Self {
        Self::build(Vec::new(), config)
    }

    /// Index `documents`.
    #[must_use]
    pub fn build(documents: Vec<SearchDocument>, config: SearchConfig) -> Self {
        let titles = documents.iter().map(|d| fold(&d.title)).collect();
        let bodies = documents.iter().map(|d| fold(&d.body)).collect();
        Self {
            config,
            documents,
            titles,
            bodies,
        }
    }

    /// Query settings this index was built with.
    #[must_use]
    pub fn config(&self) -> SearchConfig {
        self.config
    }

    /// Indexed documents in insertion order.
    #[must_use]
    pub fn documents(&self) -> &[SearchDocument] {
        &self.documents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents whose title contains `query`, ignoring case.
    ///
    /// Earlier matches rank first, then shorter titles, then paths. A blank
    /// query matches nothing.
    #[must_use]
    pub fn search_title(&self, query: &str) -> Vec<TitleHit> {
        let needle = fold(query.trim());
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(usize, usize, usize)> = self
            .titles
            .iter()
            .enumerate()
            .filter_map(|(i, title)| {
                let byte = title.find(&needle)?;
                Some((char_offset(title, byte), title.chars().count(), i))
            })
            .collect();
        hits.sort_by_key(|&(position, length, i)| (position, length, &self.documents[i].path));

        hits.into_iter()
            .take(self.config.max_results)
            .map(|(_, _, i)| TitleHit {
                path: self.documents[i].path.clone(),
                title: self.documents[i].title.clone(),
            })
            .collect()
    }

    /// Documents whose body contains `query`, ignoring case.
    ///
    /// More occurrences rank first, ties broken by path. A blank query
    /// matches nothing.
    #[must_use]
    pub fn search_full(&self, query: &str) -> Vec<FullHit> {
        let needle = fold(query.trim());
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(usize, usize)> = self
            .bodies
            .iter()
            .enumerate()
            .filter_map(|(i, body)| {
                let count = body.matches(needle.as_str()).count();
                (count > 0).then_some((count, i))
            })
            .collect();
        hits.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| self.documents[a.1].path.cmp(&self.documents[b.1].path))
        });
        hits.truncate(self.config.max_results);

        hits.into_iter()
            .map(|(matches, i)| FullHit {
                path: self.documents[i].path.clone(),
                title: self.documents[i].title.clone(),
                snippet: self.snippet(i, &needle),
                matches,
            })
            .collect()
    }

    /// Body excerpt with one window per match, up to `match_depth` matches.
    ///
    /// Overlapping windows are merged.
    fn snippet(&self, i: usize, needle: &str) -> String {
        let folded = &self.bodies[i];
        let body: Vec<char> = self.documents[i].body.chars().collect();
        let needle_len = needle.chars().count();
        let width = self.config.match_width.max(needle_len);

        let mut windows: Vec<(usize, usize)> = Vec::new();
        for (byte, _) in folded.match_indices(needle).take(self.config.match_depth) {
            let (start, end) = window(char_offset(folded, byte), needle_len, width, body.len());
            match windows.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => windows.push((start, end)),
            }
        }

        windows
            .into_iter()
            .map(|(start, end)| body[start..end].iter().collect::<String>().trim().to_owned())
            .collect::<Vec<_>>()
            .join(SNIPPET_SEPARATOR)
    }
}

/// Char range of `width` chars centered on a match, clamped to the body.
fn window(position: usize, len: usize, width: usize, total: usize) -> (usize, usize) {
    let lead = (width - len) / 2;
    let end = (position.saturating_sub(lead) + width).min(total);
    (end.saturating_sub(width), end)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    static_assertions::assert_impl_all!(SearchIndex: Send, Sync);

    fn index(docs: &[(&str, &str, &str)]) -> SearchIndex {
        index_with(docs, SearchConfig::default())
    }

    fn index_with(docs: &[(&str, &str, &str)], config: SearchConfig) -> SearchIndex {
        SearchIndex::build(
            docs.iter()
                .map(|&(path, title, body)| SearchDocument::new(path, title, body))
                .collect(),
            config,
        )
    }

    fn title_paths(hits: &[TitleHit]) -> Vec<&str> {
        hits.iter().map(|h| h.path.as_str()).collect()
    }

    fn full_paths(hits: &[FullHit]) -> Vec<&str> {
        hits.iter().map(|h| h.path.as_str()).collect()
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let index = index(&[("a.md", "Alpha", "alpha body")]);

        assert!(index.search_title("").is_empty());
        assert!(index.search_title("   ").is_empty());
        assert!(index.search_full("").is_empty());
    }

    #[test]
    fn test_title_substring_match() {
        let index = index(&[
            ("intro.md", "Introduction to X", ""),
            ("other.md", "Reference", ""),
        ]);

        let hits = index.search_title("Intro");

        assert_eq!(
            hits,
            vec![TitleHit {
                path: "intro.md".to_owned(),
                title: "Introduction to X".to_owned(),
            }]
        );
    }

    #[test]
    fn test_title_match_ignores_case() {
        let index = index(&[("api.md", "HTTP API", "")]);

        assert_eq!(index.search_title("http api").len(), 1);
        assert_eq!(index.search_title("Http").len(), 1);
    }

    #[test]
    fn test_title_hits_ordered_by_position_then_length() {
        let index = index(&[
            ("setup.md", "Setup guide", ""),
            ("user.md", "User guide", ""),
            ("guide.md", "Guide", ""),
            ("guides.md", "Guide index", ""),
        ]);

        let hits = index.search_title("guide");

        assert_eq!(
            title_paths(&hits),
            vec!["guide.md", "guides.md", "user.md", "setup.md"]
        );
    }

    #[test]
    fn test_title_results_are_bounded() {
        let docs: Vec<(String, String)> = (0..10)
            .map(|i| (format!("page-{i}.md"), format!("Page {i}")))
            .collect();
        let docs: Vec<_> = docs.iter().map(|(p, t)| (p.as_str(), t.as_str(), "")).collect();
        let config = SearchConfig {
            max_results: 3,
            ..SearchConfig::default()
        };

        let hits = index_with(&docs, config).search_title("page");

        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_full_hits_ordered_by_match_count() {
        let index = index(&[
            ("once.md", "Once", "cache appears once"),
            ("thrice.md", "Thrice", "cache, cache and more CACHE"),
            ("none.md", "None", "nothing here"),
            ("twice.md", "Twice", "cache and cache"),
        ]);

        let hits = index.search_full("cache");

        assert_eq!(
            full_paths(&hits),
            vec!["thrice.md", "twice.md", "once.md"]
        );
        assert_eq!(hits[0].matches, 3);
    }

    #[test]
    fn test_full_ties_broken_by_path() {
        let index = index(&[("b.md", "B", "needle"), ("a.md", "A", "needle")]);

        let hits = index.search_full("needle");

        assert_eq!(full_paths(&hits), vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_snippet_is_bounded_and_contains_match() {
        let body = format!("{} needle {}", "x".repeat(200), "y".repeat(200));
        let config = SearchConfig {
            match_width: 20,
            ..SearchConfig::default()
        };
        let index = index_with(&[("doc.md", "Doc", &body)], config);

        let hit = &index.search_full("needle")[0];

        assert!(hit.snippet.contains("needle"));
        assert!(hit.snippet.chars().count() <= 20);
    }

    #[test]
    fn test_snippet_covers_match_depth_windows() {
        let filler = "z".repeat(100);
        let body = format!("one {filler} key {filler} key {filler} key");
        let config = SearchConfig {
            match_depth: 2,
            match_width: 10,
            ..SearchConfig::default()
        };
        let index = index_with(&[("doc.md", "Doc", &body)], config);

        let hit = &index.search_full("key")[0];

        assert_eq!(hit.matches, 3);
        assert_eq!(hit.snippet, "zz key zzz ... zz key zzz");
    }

    #[test]
    fn test_overlapping_windows_merge() {
        let config = SearchConfig {
            match_depth: 3,
            match_width: 30,
            ..SearchConfig::default()
        };
        let index = index_with(&[("doc.md", "Doc", "a rust b rust c rust d")], config);

        let hit = &index.search_full("rust")[0];

        assert_eq!(hit.snippet, "a rust b rust c rust d");
    }

    #[test]
    fn test_snippet_handles_multibyte_text() {
        let index = index(&[("de.md", "Über", "Größe und Übersicht über Größen")]);

        let hit = &index.search_full("über")[0];

        assert_eq!(hit.matches, 2);
        assert!(hit.snippet.contains("Übersicht"));
    }

    #[test]
    fn test_query_longer_than_width() {
        let config = SearchConfig {
            match_width: 3,
            ..SearchConfig::default()
        };
        let index = index_with(&[("doc.md", "Doc", "a long needle here")], config);

        let hit = &index.search_full("long needle")[0];

        assert_eq!(hit.snippet, "long needle");
    }

    #[test]
    fn test_empty_index() {
        let index = SearchIndex::empty(SearchConfig::default());

        assert!(index.is_empty());
        assert!(index.search_title("anything").is_empty());
        assert!(index.search_full("anything").is_empty());
    }

    #[test]
    fn test_documents_preserve_input() {
        let docs = vec![
            SearchDocument::new("a.md", "A", "alpha"),
            SearchDocument::new("b.md", "B", "beta").with_modified(42),
        ];

        let index = SearchIndex::build(docs.clone(), SearchConfig::default());

        assert_eq!(index.documents(), docs.as_slice());
        assert_eq!(index.len(), 2);
    }
}
