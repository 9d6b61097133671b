//! Site state ownership and refresh coordination.
//!
//! [`Site`] owns the current [`SiteState`] and is the only place where the
//! document tree, the search index and the render cache change. Every change
//! builds a complete new state off to the side and publishes it with a single
//! reference swap.
//!
//! # Thread Safety
//!
//! - Readers clone the current `Arc<SiteState>` and use it for the whole
//!   request, so a refresh completing mid-request is never observed
//! - Refreshes and rebuilds are serialized by a mutex; triggers that arrive
//!   while a refresh is running are folded into the next pass
//! - A failed refresh publishes nothing
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use dx_site::{CommandUpdater, Site, SiteConfig};
//!
//! let config = SiteConfig::default();
//! let site = Site::builder(config)
//!     .with_updater(Arc::new(CommandUpdater::git_pull("docs")))
//!     .open()?;
//!
//! let page = site.document("guide/setup.md")?;
//! site.refresh()?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use dx_cache::{Converter, RenderCache};
use dx_search::{
    FullHit, IndexLoadError, SearchConfig, SearchDocument, SearchIndex, SnapshotStore, TitleHit,
};
use dx_tree::{
    BreadcrumbItem, DEFAULT_EXTENSIONS, DEFAULT_IGNORE_DIRS, DocumentNode, Navigation, PathIndex,
    ScanError, SiblingOrder, TitleExtractor, TreeBuilder, render_nav, sort_tree,
};
use rayon::prelude::*;

use crate::alert::{Alerter, TracingAlerter};
use crate::convert::{DocumentFormat, MarkdownConverter, plain_text};
use crate::source::{DocumentSource, FsDocumentSource};
use crate::state::SiteState;
use crate::update::{ContentUpdater, NoopUpdater, UpdateError};

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Error returned when a refresh or rebuild is aborted.
///
/// The previously published state stays current.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// Pulling new content failed.
    #[error("Content update failed: {0}")]
    Update(#[from] UpdateError),
    /// Scanning the document root failed.
    #[error("Document scan failed: {0}")]
    Scan(#[from] ScanError),
}

/// Error returned when a document cannot be served.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Not part of the current tree, or unreadable.
    #[error("Document not found: {0}")]
    NotFound(String),
}

/// A document ready for presentation.
#[derive(Clone, Debug)]
pub struct RenderedDocument {
    /// Path relative to the document root.
    pub path: String,
    pub title: String,
    /// Ancestor directories with display names.
    pub breadcrumbs: Vec<BreadcrumbItem>,
    /// Rendered markup.
    pub content: Arc<str>,
    /// Whether the markup came from the render cache.
    pub from_cache: bool,
    /// Generation of the state the document was served from.
    pub generation: u64,
}

/// Configuration for [`Site`].
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Document root.
    pub source_dir: PathBuf,
    /// Name override sidecar, relative to `source_dir` unless absolute.
    pub names_file: PathBuf,
    /// Directory names excluded from the tree and from search.
    pub ignore_dirs: Vec<String>,
    /// Accepted document extensions.
    pub extensions: Vec<String>,
    /// Skip dot-entries.
    pub skip_hidden: bool,
    pub sibling_order: SiblingOrder,
    /// Render cache entries per generation.
    pub cache_capacity: NonZeroUsize,
    pub search: SearchConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("docs"),
            names_file: PathBuf::from("map.json"),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|&d| d.to_owned()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            skip_hidden: false,
            sibling_order: SiblingOrder::default(),
            cache_capacity: dx_cache::DEFAULT_CAPACITY,
            search: SearchConfig::default(),
        }
    }
}

/// Builder for [`Site`] collaborators.
pub struct SiteBuilder {
    config: SiteConfig,
    converter: Arc<dyn Converter>,
    titles: Option<Arc<dyn TitleExtractor>>,
    source: Option<Arc<dyn DocumentSource>>,
    updater: Arc<dyn ContentUpdater>,
    alerter: Arc<dyn Alerter>,
    snapshots: Option<Arc<dyn SnapshotStore>>,
}

impl SiteBuilder {
    /// Builder with Markdown conversion, filesystem reads, no content
    /// updates, tracing alerts and no search snapshot.
    #[must_use]
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config,
            converter: Arc::new(MarkdownConverter::new()),
            titles: None,
            source: None,
            updater: Arc::new(NoopUpdater),
            alerter: Arc::new(TracingAlerter),
            snapshots: None,
        }
    }

    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    #[must_use]
    pub fn with_title_extractor(mut self, titles: Arc<dyn TitleExtractor>) -> Self {
        self.titles = Some(titles);
        self
    }

    /// Replace where raw document text is read from (defaults to `source_dir`).
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn DocumentSource>) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_updater(mut self, updater: Arc<dyn ContentUpdater>) -> Self {
        self.updater = updater;
        self
    }

    #[must_use]
    pub fn with_alerter(mut self, alerter: Arc<dyn Alerter>) -> Self {
        self.alerter = alerter;
        self
    }

    /// Persist the search index to `store` after every rebuild and reuse it
    /// at startup.
    #[must_use]
    pub fn with_snapshot_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(store);
        self
    }

    /// Scan the document root and publish the first state.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the document root cannot be scanned. Without
    /// a tree there is nothing to serve, so this is fatal to startup.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn open(self) -> Result<Site, ScanError> {
        let start = Instant::now();
        let Self {
            config,
            converter,
            titles,
            source,
            updater,
            alerter,
            snapshots,
        } = self;

        let mut tree_builder = TreeBuilder::new(config.source_dir.clone())
            .with_ignore(config.ignore_dirs.iter().cloned())
            .with_extensions(&config.extensions)
            .with_skip_hidden(config.skip_hidden);
        if let Some(titles) = titles {
            tree_builder = tree_builder.with_title_extractor(titles);
        }
        let source = source
            .unwrap_or_else(|| Arc::new(FsDocumentSource::new(config.source_dir.clone())));
        let initial = SiteState::empty(config.cache_capacity, Arc::clone(&converter), config.search);

        let site = Site {
            names_path: config.source_dir.join(&config.names_file),
            config,
            tree_builder,
            converter,
            source,
            updater,
            alerter,
            snapshots,
            refresh_lock: Mutex::new(()),
            current_state: RwLock::new(Arc::new(initial)),
            requested: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        };

        let restored = site.restore_snapshot();
        let state = site.publish(site.build_state(restored.as_ref(), 1)?);
        tracing::info!(
            source_dir = %site.config.source_dir.display(),
            document_count = state.document_count(),
            restored = restored.is_some(),
            elapsed_ms = elapsed_ms(start),
            "Site opened"
        );
        Ok(site)
    }
}

/// Owner of the published site state.
pub struct Site {
    config: SiteConfig,
    tree_builder: TreeBuilder,
    names_path: PathBuf,
    converter: Arc<dyn Converter>,
    source: Arc<dyn DocumentSource>,
    updater: Arc<dyn ContentUpdater>,
    alerter: Arc<dyn Alerter>,
    snapshots: Option<Arc<dyn SnapshotStore>>,
    /// Serializes refreshes and rebuilds.
    refresh_lock: Mutex<()>,
    /// Current state (atomically swappable).
    current_state: RwLock<Arc<SiteState>>,
    /// Refresh tickets handed out.
    requested: AtomicU64,
    /// Highest ticket covered by a successful refresh.
    completed: AtomicU64,
}

impl Site {
    #[must_use]
    pub fn builder(config: SiteConfig) -> SiteBuilder {
        SiteBuilder::new(config)
    }

    /// Open a site with default collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the document root cannot be scanned.
    pub fn open(config: SiteConfig) -> Result<Self, ScanError> {
        SiteBuilder::new(config).open()
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Current state snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn state(&self) -> Arc<SiteState> {
        Arc::clone(&self.current_state.read().unwrap())
    }

    /// Current navigation tree.
    #[must_use]
    pub fn navigation(&self) -> Navigation {
        self.state().navigation.clone()
    }

    /// Render a document from the current state.
    ///
    /// Markdown goes through the generation's render cache; HTML documents
    /// are returned as they are.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if `relative_path` is not a file in
    /// the current tree or cannot be read.
    pub fn document(&self, relative_path: &str) -> Result<RenderedDocument, DocumentError> {
        let state = self.state();
        let path = relative_path.trim_matches('/');
        let not_found = || DocumentError::NotFound(path.to_owned());

        let node = state.tree.find_file(path).ok_or_else(not_found)?;

        let (content, from_cache) = if let Some(markup) = state.cache.get(path) {
            (markup, true)
        } else {
            let raw = self.source.read_raw(path).map_err(|e| {
                tracing::debug!(path, error = %e, "Document unreadable");
                not_found()
            })?;
            match DocumentFormat::of(path) {
                DocumentFormat::Html => (Arc::from(raw), false),
                DocumentFormat::Markdown => {
                    let rendered = state.cache.render(path, &raw);
                    (rendered.markup, rendered.from_cache)
                }
            }
        };

        Ok(RenderedDocument {
            path: path.to_owned(),
            title: node.label().to_owned(),
            breadcrumbs: state.names.breadcrumbs(path),
            content,
            from_cache,
            generation: state.generation,
        })
    }

    /// Whether a path below the document root is outside what the site
    /// publishes (ignored directories, skipped dot-entries).
    #[must_use]
    pub fn excludes(&self, relative_path: &str) -> bool {
        self.tree_builder.excludes(relative_path)
    }

    #[must_use]
    pub fn search_title(&self, query: &str) -> Vec<TitleHit> {
        self.state().search.search_title(query)
    }

    #[must_use]
    pub fn search_full(&self, query: &str) -> Vec<FullHit> {
        self.state().search.search_full(query)
    }

    /// Pull new content and publish a rebuilt state.
    ///
    /// Concurrent calls run one at a time. A call that was made before a
    /// successful refresh started returns as soon as that refresh finishes
    /// instead of running another pass.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError`] if the pull or the scan fails; the current
    /// state is left untouched and the failure is reported to the alerter.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn refresh(&self) -> Result<(), RefreshError> {
        let ticket = self.requested.fetch_add(1, Ordering::AcqRel) + 1;
        let _guard = self.refresh_lock.lock().unwrap();

        if self.completed.load(Ordering::Acquire) >= ticket {
            tracing::debug!(ticket, "Refresh already covered by a completed pass");
            return Ok(());
        }
        let covered = self.requested.load(Ordering::Acquire);

        let start = Instant::now();
        let result = self
            .updater
            .pull()
            .map_err(RefreshError::from)
            .and_then(|()| {
                let pull_ms = elapsed_ms(start);
                let state = self.rebuild_locked()?;
                tracing::info!(
                    generation = state.generation,
                    document_count = state.document_count(),
                    pull_ms,
                    elapsed_ms = elapsed_ms(start),
                    "Site refreshed"
                );
                Ok(())
            });

        match &result {
            Ok(()) => {
                self.completed.fetch_max(covered, Ordering::AcqRel);
                self.alerter.info("Documentation updated");
            }
            Err(e) => self.alerter.error("Refresh failed, keeping current site", e),
        }
        result
    }

    /// Publish a rebuilt state without pulling new content.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::Scan`] if the document root cannot be scanned;
    /// the current state is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn rebuild(&self) -> Result<(), RefreshError> {
        let _guard = self.refresh_lock.lock().unwrap();
        let start = Instant::now();

        match self.rebuild_locked() {
            Ok(state) => {
                tracing::info!(
                    generation = state.generation,
                    document_count = state.document_count(),
                    elapsed_ms = elapsed_ms(start),
                    "Site rebuilt"
                );
                Ok(())
            }
            Err(e) => {
                self.alerter.error("Rebuild failed, keeping current site", &e);
                Err(e.into())
            }
        }
    }

    /// Build and publish the next generation. Caller holds `refresh_lock`.
    fn rebuild_locked(&self) -> Result<Arc<SiteState>, ScanError> {
        let previous = self.state();
        let state = self.build_state(Some(&previous.search), previous.generation + 1)?;
        Ok(self.publish(state))
    }

    fn build_state(
        &self,
        previous: Option<&SearchIndex>,
        generation: u64,
    ) -> Result<SiteState, ScanError> {
        let scan_start = Instant::now();
        let names = PathIndex::load_or_default(&self.names_path);
        let mut tree = self.tree_builder.build(&names)?;
        sort_tree(&mut tree, &names, self.config.sibling_order);
        let navigation = render_nav(&tree);
        let scan_ms = elapsed_ms(scan_start);

        let index_start = Instant::now();
        let search = self.index_documents(&tree, previous);
        tracing::debug!(
            generation,
            scan_ms,
            index_ms = elapsed_ms(index_start),
            "Built site state"
        );

        Ok(SiteState {
            tree,
            names,
            navigation,
            search,
            cache: RenderCache::new(self.config.cache_capacity, Arc::clone(&self.converter)),
            generation,
        })
    }

    /// Index every file of `tree`, reusing bodies from `previous` for files
    /// whose modification time is unchanged.
    fn index_documents(&self, tree: &DocumentNode, previous: Option<&SearchIndex>) -> SearchIndex {
        let known: HashMap<&str, &SearchDocument> = previous
            .map(|index| {
                index
                    .documents()
                    .iter()
                    .map(|d| (d.path.as_str(), d))
                    .collect()
            })
            .unwrap_or_default();

        let documents: Vec<SearchDocument> = tree
            .files()
            .par_iter()
            .map(|node| self.search_document(node, known.get(node.relative_path.as_str()).copied()))
            .collect();

        SearchIndex::build(documents, self.config.search)
    }

    fn search_document(&self, node: &DocumentNode, known: Option<&SearchDocument>) -> SearchDocument {
        let path = node.relative_path.as_str();
        let title = node.label().to_owned();
        let modified = self.source.modified(path);

        if let Some(doc) = known.filter(|d| modified.is_some() && d.modified == modified) {
            return SearchDocument {
                title,
                ..doc.clone()
            };
        }

        let body = match self.source.read_raw(path) {
            Ok(raw) => plain_text(DocumentFormat::of(path), &raw),
            Err(e) => {
                tracing::debug!(path, error = %e, "Indexing document without body");
                String::new()
            }
        };
        SearchDocument {
            path: path.to_owned(),
            title,
            body,
            modified,
        }
    }

    /// Swap in `state`, then drop the previous generation's cached markup.
    fn publish(&self, state: SiteState) -> Arc<SiteState> {
        let state = Arc::new(state);
        let previous =
            std::mem::replace(&mut *self.current_state.write().unwrap(), Arc::clone(&state));
        previous.cache.clear();
        self.persist_search(&state.search);
        state
    }

    fn restore_snapshot(&self) -> Option<SearchIndex> {
        let store = self.snapshots.as_deref()?;
        match SearchIndex::try_load(store, self.config.search) {
            Ok(index) => {
                tracing::debug!(document_count = index.len(), "Restored search snapshot");
                Some(index)
            }
            Err(IndexLoadError::Missing) => None,
            Err(e) => {
                self.alerter.error("Ignoring search snapshot", &e);
                None
            }
        }
    }

    fn persist_search(&self, index: &SearchIndex) {
        if let Some(store) = self.snapshots.as_deref()
            && let Err(e) = index.persist(store)
        {
            self.alerter.error("Failed to persist search snapshot", &e);
        }
    }
}
