//! HTTP request handlers.

pub(crate) mod index;
pub(crate) mod navigation;
pub(crate) mod pages;
pub(crate) mod search;
pub(crate) mod update;

/// Convert a document path (relative to the root) to a URL path.
///
/// The site stores paths without leading slashes (e.g. "guide/setup.md"),
/// clients link with them (e.g. "/guide/setup.md").
pub(crate) fn to_url_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_url_path() {
        assert_eq!(to_url_path(""), "/");
        assert_eq!(to_url_path("guide/setup.md"), "/guide/setup.md");
        assert_eq!(to_url_path("/readme.md"), "/readme.md");
    }
}
