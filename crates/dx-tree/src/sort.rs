//! Sibling ordering.
//!
//! Directories are ordered by their configured `sort` key (ascending, stable,
//! unconfigured = 0). In the default [`SiblingOrder::FilesFirst`] mode all file
//! children keep their discovery order and are placed before the sorted
//! directories, regardless of sort keys. [`SiblingOrder::Interleaved`] orders
//! files and directories together by key instead.

use serde::Deserialize;

use crate::node::DocumentNode;
use crate::path_index::PathIndex;

/// How file and directory siblings are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiblingOrder {
    /// Files in discovery order, then directories by sort key.
    #[default]
    FilesFirst,
    /// Files and directories ordered together by sort key.
    Interleaved,
}

/// Reorder every directory's children in place, recursively.
///
/// Sorting is idempotent: applying it to an already sorted tree leaves the
/// order unchanged.
pub fn sort_tree(node: &mut DocumentNode, names: &PathIndex, order: SiblingOrder) {
    let mut stack = vec![node];
    while let Some(dir) = stack.pop() {
        sort_siblings(&mut dir.children, names, order);
        stack.extend(dir.children.iter_mut().filter(|c| c.is_dir()));
    }
}

fn sort_siblings(children: &mut Vec<DocumentNode>, names: &PathIndex, order: SiblingOrder) {
    match order {
        SiblingOrder::FilesFirst => {
            let (mut files, mut dirs): (Vec<_>, Vec<_>) =
                std::mem::take(children).into_iter().partition(DocumentNode::is_file);
            dirs.sort_by_key(|d| names.sort_key(&d.item_name));
            files.append(&mut dirs);
            *children = files;
        }
        SiblingOrder::Interleaved => {
            children.sort_by_key(|c| names.sort_key(&c.item_name));
        }
    }
}
