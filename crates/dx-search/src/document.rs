use serde::{Deserialize, Serialize};

/// Unit of indexing: one per file node of the document tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Document path relative to the document root.
    pub path: String,
    /// Document title.
    pub title: String,
    /// Normalized plain text of the document.
    pub body: String,
    /// Source modification time in nanoseconds since the Unix epoch.
    ///
    /// Used to decide whether a snapshot entry is still current.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<u64>,
}

impl SearchDocument {
    /// Create a document without a modification time.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            body: body.into(),
            modified: None,
        }
    }

    /// Attach a source modification time.
    #[must_use]
    pub fn with_modified(mut self, modified: u64) -> Self {
        self.modified = Some(modified);
        self
    }
}
