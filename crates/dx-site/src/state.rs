//! Published site state.

use std::num::NonZeroUsize;
use std::sync::Arc;

use dx_cache::{Converter, RenderCache};
use dx_search::{SearchConfig, SearchIndex};
use dx_tree::{DocumentNode, Navigation, PathIndex};

/// One consistent generation of the site.
///
/// Tree, navigation, search index and render cache are built together and
/// published as a unit. A state is never modified after publication except
/// for its render cache filling up.
pub struct SiteState {
    pub(crate) tree: DocumentNode,
    pub(crate) names: PathIndex,
    pub(crate) navigation: Navigation,
    pub(crate) search: SearchIndex,
    pub(crate) cache: RenderCache,
    pub(crate) generation: u64,
}

impl SiteState {
    /// State with no documents, used before the first scan completes.
    pub(crate) fn empty(
        cache_capacity: NonZeroUsize,
        converter: Arc<dyn Converter>,
        search: SearchConfig,
    ) -> Self {
        Self {
            tree: DocumentNode::directory("", "", "", Vec::new()),
            names: PathIndex::new(),
            navigation: Navigation::default(),
            search: SearchIndex::empty(search),
            cache: RenderCache::new(cache_capacity, converter),
            generation: 0,
        }
    }

    /// Sorted document tree.
    #[must_use]
    pub fn tree(&self) -> &DocumentNode {
        &self.tree
    }

    /// Name overrides the tree was built with.
    #[must_use]
    pub fn names(&self) -> &PathIndex {
        &self.names
    }

    #[must_use]
    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    #[must_use]
    pub fn search(&self) -> &SearchIndex {
        &self.search
    }

    /// Render cache belonging to this generation.
    #[must_use]
    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Increases by one with every published rebuild.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of documents in the tree.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.search.len()
    }
}
