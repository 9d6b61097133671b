//! Display names and sort keys for tree entries.
//!
//! Overrides come from an optional sidecar file at the top of the document
//! root (`map.json` by default). The file maps raw entry names to an
//! [`OrderingEntry`]:
//!
//! ```json
//! {
//!     "guide": { "name": "User Guide", "sort": 2 },
//!     "api": { "name": "API", "sort": 1 }
//! }
//! ```
//!
//! Files ending in `.yaml` or `.yml` are parsed as YAML with the same shape.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Per-name override for display and ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct OrderingEntry {
    /// Display name replacing the raw directory name.
    #[serde(default)]
    pub name: Option<String>,
    /// Ordering key among sibling directories. Missing means 0.
    #[serde(default)]
    pub sort: Option<i64>,
}

/// Breadcrumb navigation item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BreadcrumbItem {
    /// Display title.
    pub title: String,
    /// Relative path of the directory.
    pub path: String,
}

/// Error returned when the sidecar file exists but cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum PathIndexError {
    /// File could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Sidecar path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// JSON content is malformed.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// Sidecar path.
        path: PathBuf,
        /// Parse error.
        #[source]
        source: serde_json::Error,
    },
    /// YAML content is malformed.
    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        /// Sidecar path.
        path: PathBuf,
        /// Parse error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Name override table keyed by raw entry name.
///
/// Read-only once loaded; a new index is loaded on every refresh so edits to
/// the sidecar arrive together with content updates.
#[derive(Clone, Debug, Default)]
pub struct PathIndex {
    entries: HashMap<String, OrderingEntry>,
}

impl PathIndex {
    /// Create an empty index (no overrides).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `(name, entry)` pairs.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, OrderingEntry)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Load the sidecar file.
    ///
    /// A missing file yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`PathIndexError`] when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, PathIndexError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(source) => {
                return Err(PathIndexError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let entries = if is_yaml {
            serde_yaml::from_str::<Option<HashMap<String, OrderingEntry>>>(&content)
                .map_err(|source| PathIndexError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })?
                .unwrap_or_default()
        } else {
            serde_json::from_str(&content).map_err(|source| PathIndexError::Json {
                path: path.to_path_buf(),
                source,
            })?
        };

        Ok(Self { entries })
    }

    /// Load the sidecar file, logging and ignoring any error.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring name overrides");
            Self::new()
        })
    }

    /// Override entry for a raw name.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&OrderingEntry> {
        self.entries.get(name)
    }

    /// Display name for a raw name, falling back to the name itself.
    #[must_use]
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.entry(name)
            .and_then(|e| e.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(name)
    }

    /// Sort key for a raw name (0 when unconfigured).
    #[must_use]
    pub fn sort_key(&self, name: &str) -> i64 {
        self.entry(name).and_then(|e| e.sort).unwrap_or(0)
    }

    /// Breadcrumbs for the directories above a document.
    ///
    /// `"guide/setup/intro.md"` yields items for `guide` and `guide/setup`.
    #[must_use]
    pub fn breadcrumbs(&self, relative_path: &str) -> Vec<BreadcrumbItem> {
        let Some((dirs, _file)) = relative_path.trim_matches('/').rsplit_once('/') else {
            return Vec::new();
        };

        let mut path = String::new();
        dirs.split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| {
                if !path.is_empty() {
                    path.push('/');
                }
                path.push_str(segment);
                BreadcrumbItem {
                    title: self.display_name(segment).to_owned(),
                    path: path.clone(),
                }
            })
            .collect()
    }

    /// Number of configured entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no overrides are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
