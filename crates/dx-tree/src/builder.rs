//! Document discovery by filesystem walking.
//!
//! [`TreeBuilder`] scans the document root depth-first and produces a
//! [`DocumentNode`] tree. Entries inside each directory are visited in
//! lexicographic name order so repeated scans of the same filesystem yield the
//! same tree.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ScanError;
use crate::node::DocumentNode;
use crate::path_index::PathIndex;
use crate::title::{HeadingTitleExtractor, TitleExtractor};

/// Extensions accepted as documents when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "markdown", "html", "htm"];

/// Directory names ignored when none are configured.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[".git"];

/// Scans a document root into a tree of directory and file nodes.
pub struct TreeBuilder {
    root: PathBuf,
    ignore: HashSet<String>,
    extensions: Vec<String>,
    skip_hidden: bool,
    titles: Arc<dyn TitleExtractor>,
}

impl TreeBuilder {
    /// Create a builder for `root` with default extensions, `.git` ignored,
    /// dot-entries kept, and heading-based titles.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ignore: DEFAULT_IGNORE_DIRS.iter().map(|&d| d.to_owned()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            skip_hidden: false,
            titles: Arc::new(HeadingTitleExtractor::new()),
        }
    }

    /// Set directory names excluded from the tree.
    #[must_use]
    pub fn with_ignore<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set accepted file extensions (without dot, matched case-insensitively).
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Whether to skip entries whose name starts with a dot.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }

    /// Replace the title extractor.
    #[must_use]
    pub fn with_title_extractor(mut self, titles: Arc<dyn TitleExtractor>) -> Self {
        self.titles = titles;
        self
    }

    /// Check whether a file name has an accepted document extension.
    #[must_use]
    pub fn accepts(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }

    /// Check whether a relative path lies in a part of the root the scan
    /// never enters: below an ignored directory or, with hidden skipping
    /// enabled, a dot-entry. Paths with `.` or `..` segments are excluded.
    ///
    /// The file extension is not considered, so this also applies to assets.
    #[must_use]
    pub fn excludes(&self, relative_path: &str) -> bool {
        let mut segments: Vec<&str> = relative_path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let Some(file_name) = segments.pop() else {
            return false;
        };
        let hidden = |s: &str| self.skip_hidden && s.starts_with('.');
        file_name == "."
            || file_name == ".."
            || hidden(file_name)
            || segments
                .iter()
                .any(|s| *s == "." || *s == ".." || self.ignore.contains(*s) || hidden(s))
    }

    /// Scan the document root.
    ///
    /// Directories get their display name from `names`. Files get their title
    /// from the configured [`TitleExtractor`]; unreadable files fall back to
    /// the file name without extension and stay in the tree.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the root or any non-ignored directory cannot be
    /// listed, or if a directory symlink points back at one of its ancestors.
    pub fn build(&self, names: &PathIndex) -> Result<DocumentNode, ScanError> {
        let mut ancestors = Vec::new();
        let children = self.scan_dir(&self.root, "", names, &mut ancestors)?;
        let root_name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let display = names.display_name(&root_name).to_owned();
        Ok(DocumentNode::directory(root_name, "", display, children))
    }

    fn scan_dir(
        &self,
        dir: &Path,
        rel_prefix: &str,
        names: &PathIndex,
        ancestors: &mut Vec<PathBuf>,
    ) -> Result<Vec<DocumentNode>, ScanError> {
        let canonical = fs::canonicalize(dir).map_err(|e| ScanError::io(dir, e))?;
        if ancestors.contains(&canonical) {
            return Err(ScanError::SymlinkLoop(dir.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| ScanError::io(dir, e))? {
            let entry = entry.map_err(|e| ScanError::io(dir, e))?;
            entries.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        ancestors.push(canonical);
        let mut children = Vec::new();
        for (name, path) in entries {
            if self.skip_hidden && name.starts_with('.') {
                continue;
            }

            let rel_path = if rel_prefix.is_empty() {
                name.clone()
            } else {
                format!("{rel_prefix}/{name}")
            };

            // Follow symlinks, like stat
            let metadata = match fs::metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if metadata.is_dir() {
                if self.ignore.contains(&name) {
                    continue;
                }
                let grandchildren = self.scan_dir(&path, &rel_path, names, ancestors)?;
                let display = names.display_name(&name).to_owned();
                children.push(DocumentNode::directory(name, rel_path, display, grandchildren));
            } else if self.accepts(&name) {
                let stem = Path::new(&name)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let title = match fs::read_to_string(&path) {
                    Ok(raw) => self.titles.extract_title(&raw, &stem),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Using file name as title");
                        stem.clone()
                    }
                };
                children.push(DocumentNode::file(stem, rel_path, title));
            }
        }
        ancestors.pop();

        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::node::NodeKind;
    use crate::path_index::OrderingEntry;

    fn file_paths(tree: &DocumentNode) -> BTreeSet<String> {
        tree.files().iter().map(|n| n.relative_path.clone()).collect()
    }

    #[test]
    fn test_build_readme_and_guide() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("readme.md"), "# Welcome\n").unwrap();
        fs::create_dir(tmp.path().join("guide")).unwrap();
        fs::write(tmp.path().join("guide/setup.md"), "# Setup\n").unwrap();

        let tree = TreeBuilder::new(tmp.path().to_path_buf())
            .build(&PathIndex::new())
            .unwrap();

        assert_eq!(tree.kind, NodeKind::Directory);
        assert_eq!(tree.children.len(), 2);

        let guide = tree.find("guide").unwrap();
        assert_eq!(guide.kind, NodeKind::Directory);
        assert_eq!(guide.display_name.as_deref(), Some("guide"));
        assert_eq!(guide.children.len(), 1);
        assert_eq!(guide.children[0].item_name, "setup");
        assert_eq!(guide.children[0].title.as_deref(), Some("Setup"));

        let readme = tree.find("readme.md").unwrap();
        assert_eq!(readme.item_name, "readme");
        assert_eq!(readme.title.as_deref(), Some("Welcome"));
    }

    #[test]
    fn test_build_filters_extensions_case_insensitively() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "# A").unwrap();
        fs::write(tmp.path().join("b.HTML"), "<h1>B</h1>").unwrap();
        fs::write(tmp.path().join("c.htm"), "").unwrap();
        fs::write(tmp.path().join("d.txt"), "# D").unwrap();
        fs::write(tmp.path().join("map.json"), "{}").unwrap();
        fs::write(tmp.path().join("noext"), "# E").unwrap();

        let tree = TreeBuilder::new(tmp.path().to_path_buf())
            .build(&PathIndex::new())
            .unwrap();

        let expected: BTreeSet<String> = ["a.md", "b.HTML", "c.htm"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(file_paths(&tree), expected);
        assert_eq!(tree.find("b.HTML").unwrap().title.as_deref(), Some("B"));
        assert_eq!(tree.find("c.htm").unwrap().title.as_deref(), Some("c"));
    }

    #[test]
    fn test_build_skips_ignored_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("drafts/deep")).unwrap();
        fs::write(tmp.path().join("drafts/deep/wip.md"), "# WIP").unwrap();
        fs::create_dir(tmp.path().join("guide")).unwrap();
        fs::write(tmp.path().join("guide/setup.md"), "# Setup").unwrap();

        let tree = TreeBuilder::new(tmp.path().to_path_buf())
            .with_ignore(["drafts"])
            .build(&PathIndex::new())
            .unwrap();

        assert!(tree.find("drafts").is_none());
        assert_eq!(
            file_paths(&tree),
            BTreeSet::from(["guide/setup.md".to_owned()])
        );
    }

    #[test]
    fn test_ignore_matches_name_at_any_depth() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("guide/assets")).unwrap();
        fs::write(tmp.path().join("guide/assets/x.md"), "# X").unwrap();

        let tree = TreeBuilder::new(tmp.path().to_path_buf())
            .with_ignore(["assets"])
            .build(&PathIndex::new())
            .unwrap();

        assert!(tree.find("guide/assets").is_none());
        assert!(tree.find("guide").is_some());
    }

    #[test]
    fn test_build_keeps_dot_files_but_ignores_git_by_default() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        fs::write(tmp.path().join(".git/notes.md"), "# Git").unwrap();
        fs::create_dir(tmp.path().join(".github")).unwrap();
        fs::write(tmp.path().join(".github/contributing.md"), "# Contributing").unwrap();
        fs::write(tmp.path().join(".notes.md"), "# Notes").unwrap();
        fs::write(tmp.path().join("readme.md"), "# Readme").unwrap();

        let tree = TreeBuilder::new(tmp.path().to_path_buf())
            .build(&PathIndex::new())
            .unwrap();

        let expected: BTreeSet<String> = [".github/contributing.md", ".notes.md", "readme.md"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(file_paths(&tree), expected);
    }

    #[test]
    fn test_build_skip_hidden() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".github")).unwrap();
        fs::write(tmp.path().join(".github/contributing.md"), "# Contributing").unwrap();
        fs::write(tmp.path().join(".hidden.md"), "# Hidden").unwrap();
        fs::write(tmp.path().join("visible.md"), "# Visible").unwrap();

        let tree = TreeBuilder::new(tmp.path().to_path_buf())
            .with_skip_hidden(true)
            .build(&PathIndex::new())
            .unwrap();

        assert_eq!(file_paths(&tree), BTreeSet::from(["visible.md".to_owned()]));
    }

    #[test]
    fn test_build_keeps_empty_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("empty")).unwrap();

        let tree = TreeBuilder::new(tmp.path().to_path_buf())
            .build(&PathIndex::new())
            .unwrap();

        let empty = tree.find("empty").unwrap();
        assert!(empty.is_dir());
        assert!(empty.children.is_empty());
    }

    #[test]
    fn test_build_resolves_display_names() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("guide")).unwrap();
        let names = PathIndex::from_entries([(
            "guide",
            OrderingEntry {
                name: Some("User Guide".to_owned()),
                sort: None,
            },
        )]);

        let tree = TreeBuilder::new(tmp.path().to_path_buf())
            .build(&names)
            .unwrap();

        assert_eq!(
            tree.find("guide").unwrap().display_name.as_deref(),
            Some("User Guide")
        );
    }

    #[test]
    fn test_build_title_falls_back_to_file_stem() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("setup-guide.md"), "No heading here.").unwrap();
        fs::write(tmp.path().join("binary.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let tree = TreeBuilder::new(tmp.path().to_path_buf())
            .build(&PathIndex::new())
            .unwrap();

        assert_eq!(
            tree.find("setup-guide.md").unwrap().title.as_deref(),
            Some("setup-guide")
        );
        assert_eq!(
            tree.find("binary.md").unwrap().title.as_deref(),
            Some("binary")
        );
    }

    #[test]
    fn test_build_discovery_order_is_lexicographic() {
        let tmp = TempDir::new().unwrap();
        for name in ["c.md", "a.md", "b.md"] {
            fs::write(tmp.path().join(name), "").unwrap();
        }

        let tree = TreeBuilder::new(tmp.path().to_path_buf())
            .build(&PathIndex::new())
            .unwrap();

        let names: Vec<_> = tree.children.iter().map(|n| n.item_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_build_missing_root_errors() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("missing");

        let err = TreeBuilder::new(root.clone())
            .build(&PathIndex::new())
            .unwrap_err();

        assert!(matches!(err, ScanError::Io { .. }));
        assert_eq!(err.path(), root);
    }

    #[cfg(unix)]
    #[test]
    fn test_build_detects_symlink_loop() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("a")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("a"), tmp.path().join("a/loop")).unwrap();

        let err = TreeBuilder::new(tmp.path().to_path_buf())
            .build(&PathIndex::new())
            .unwrap_err();

        assert!(matches!(err, ScanError::SymlinkLoop(_)));
    }

    #[test]
    fn test_excludes() {
        let builder = TreeBuilder::new(PathBuf::from("docs")).with_ignore(["drafts"]);

        assert!(builder.excludes("drafts/wip.md"));
        assert!(builder.excludes("/guide/drafts/logo.png"));
        assert!(builder.excludes("../secret.md"));
        assert!(builder.excludes("guide/.."));
        assert!(!builder.excludes("readme.md"));
        assert!(!builder.excludes("images/logo.png"));
        assert!(!builder.excludes(".notes.md"));
        assert!(!builder.excludes(""));
    }

    #[test]
    fn test_excludes_dot_entries_when_skipping_hidden() {
        let builder = TreeBuilder::new(PathBuf::from("docs")).with_skip_hidden(true);

        assert!(builder.excludes(".notes.md"));
        assert!(builder.excludes(".github/contributing.md"));
        assert!(!builder.excludes("guide/setup.md"));
    }
}
