//! Navigation structure for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::node::{DocumentNode, NodeKind};

/// Navigation item with children for UI tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    /// File or directory.
    pub kind: NodeKind,
    /// Display title (document title or directory display name).
    pub title: String,
    /// Relative path without leading slash.
    pub path: String,
    /// Child navigation items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

/// Navigation tree for the whole site.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    /// Top-level items, in sibling order.
    pub items: Vec<NavItem>,
}

impl Navigation {
    /// Number of file items at any depth.
    #[must_use]
    pub fn document_count(&self) -> usize {
        fn count(items: &[NavItem]) -> usize {
            items
                .iter()
                .map(|i| usize::from(i.kind == NodeKind::File) + count(&i.children))
                .sum()
        }
        count(&self.items)
    }
}

/// Map a sorted tree to its navigation structure.
///
/// The root node itself is not included; its children become the top-level
/// items.
#[must_use]
pub fn render_nav(root: &DocumentNode) -> Navigation {
    Navigation {
        items: root.children.iter().map(nav_item).collect(),
    }
}

fn nav_item(node: &DocumentNode) -> NavItem {
    NavItem {
        kind: node.kind,
        title: node.label().to_owned(),
        path: node.relative_path.clone(),
        children: node.children.iter().map(nav_item).collect(),
    }
}
