//! Document tree discovery, ordering and navigation for DX.
//!
//! This crate turns a directory of documents into the structure the rest of
//! the server works with:
//!
//! - [`PathIndex`]: display names and sort keys from the `map.json` sidecar
//! - [`TreeBuilder`]: recursive scan producing a [`DocumentNode`] tree
//! - [`sort_tree`]: sibling ordering driven by the [`PathIndex`]
//! - [`render_nav`]: serializable [`Navigation`] for the presentation layer
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use dx_tree::{PathIndex, SiblingOrder, TreeBuilder, render_nav, sort_tree};
//!
//! let root = PathBuf::from("docs");
//! let names = PathIndex::load_or_default(&root.join("map.json"));
//! let mut tree = TreeBuilder::new(root).build(&names)?;
//! sort_tree(&mut tree, &names, SiblingOrder::FilesFirst);
//! let nav = render_nav(&tree);
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod nav;
mod node;
mod path_index;
mod sort;
mod title;

pub use builder::{DEFAULT_EXTENSIONS, DEFAULT_IGNORE_DIRS, TreeBuilder};
pub use error::ScanError;
pub use nav::{NavItem, Navigation, render_nav};
pub use node::{DocumentNode, NodeKind};
pub use path_index::{BreadcrumbItem, OrderingEntry, PathIndex, PathIndexError};
pub use sort::{SiblingOrder, sort_tree};
pub use title::{HeadingTitleExtractor, TitleExtractor};
