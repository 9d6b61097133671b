//! Title and full-text search over DX documents.
//!
//! A [`SearchIndex`] is built once from a set of [`SearchDocument`]s and is
//! immutable afterwards. Replacing the index means building a new one and
//! swapping the reference, so concurrent readers always see a complete index.
//!
//! Matching is plain case-insensitive substring search:
//!
//! - [`SearchIndex::search_title`] ranks by match position, then title length
//! - [`SearchIndex::search_full`] ranks by number of occurrences and returns
//!   a snippet around the first few matches
//!
//! Snapshots round-trip the document set through a [`SnapshotStore`] so a
//! restart does not need to re-read every document.
//!
//! # Example
//!
//! ```
//! use dx_search::{SearchConfig, SearchDocument, SearchIndex};
//!
//! let index = SearchIndex::build(
//!     vec![SearchDocument::new("intro.md", "Introduction to DX", "Getting started.")],
//!     SearchConfig::default(),
//! );
//! let hits = index.search_title("intro");
//! assert_eq!(hits[0].path, "intro.md");
//! assert!(index.search_title("").is_empty());
//! ```

mod document;
mod fold;
mod index;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod snapshot;

pub use document::SearchDocument;
pub use index::{FullHit, SearchConfig, SearchIndex, TitleHit};
#[cfg(any(test, feature = "mock"))]
pub use mock::MemorySnapshotStore;
pub use snapshot::{
    FileSnapshotStore, IndexLoadError, PersistError, SNAPSHOT_VERSION, SnapshotStore,
};
