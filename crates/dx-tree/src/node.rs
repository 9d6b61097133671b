//! Document tree nodes.

use serde::{Deserialize, Serialize};

/// Kind of tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A servable document.
    File,
    /// A directory of documents.
    Directory,
}

/// One file or directory in the document tree.
///
/// `relative_path` uses `/` separators without a leading slash and is unique
/// across the tree; the root directory has an empty path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentNode {
    /// Raw entry name. For files this is the name without extension.
    pub item_name: String,
    /// File or directory.
    pub kind: NodeKind,
    /// Path relative to the document root.
    pub relative_path: String,
    /// Resolved display name (directories only).
    pub display_name: Option<String>,
    /// Document title (files only).
    pub title: Option<String>,
    /// Ordered children (directories only).
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// Create a file node.
    #[must_use]
    pub fn file(
        item_name: impl Into<String>,
        relative_path: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            item_name: item_name.into(),
            kind: NodeKind::File,
            relative_path: relative_path.into(),
            display_name: None,
            title: Some(title.into()),
            children: Vec::new(),
        }
    }

    /// Create a directory node.
    #[must_use]
    pub fn directory(
        item_name: impl Into<String>,
        relative_path: impl Into<String>,
        display_name: impl Into<String>,
        children: Vec<DocumentNode>,
    ) -> Self {
        Self {
            item_name: item_name.into(),
            kind: NodeKind::Directory,
            relative_path: relative_path.into(),
            display_name: Some(display_name.into()),
            title: None,
            children,
        }
    }

    /// True for file nodes.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// True for directory nodes.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Human-readable label: title for files, display name for directories.
    #[must_use]
    pub fn label(&self) -> &str {
        match self.kind {
            NodeKind::File => self.title.as_deref(),
            NodeKind::Directory => self.display_name.as_deref(),
        }
        .unwrap_or(&self.item_name)
    }

    /// All file nodes in depth-first order.
    #[must_use]
    pub fn files(&self) -> Vec<&DocumentNode> {
        let mut files = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_file() {
                files.push(node);
            }
            // Reverse so the first child is visited first
            stack.extend(node.children.iter().rev());
        }
        files
    }

    /// Find a node by relative path.
    #[must_use]
    pub fn find(&self, relative_path: &str) -> Option<&DocumentNode> {
        let target = relative_path.trim_matches('/');
        let mut current = self;
        if target.is_empty() {
            return Some(current);
        }
        'descend: loop {
            for child in &current.children {
                if child.relative_path == target {
                    return Some(child);
                }
                if child.is_dir()
                    && target
                        .strip_prefix(child.relative_path.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
                {
                    current = child;
                    continue 'descend;
                }
            }
            return None;
        }
    }

    /// Find a file node by relative path.
    #[must_use]
    pub fn find_file(&self, relative_path: &str) -> Option<&DocumentNode> {
        self.find(relative_path).filter(|n| n.is_file())
    }
}
