//! Render cache for DX.
//!
//! Converting a document to markup is the expensive part of serving a page.
//! [`RenderCache`] memoizes a [`Converter`] per document path with a fixed
//! entry capacity and strict least-recently-used eviction.
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use std::sync::Arc;
//! use dx_cache::{Converter, RenderCache};
//!
//! struct Upper;
//!
//! impl Converter for Upper {
//!     fn to_markup(&self, raw: &str) -> String {
//!         raw.to_uppercase()
//!     }
//! }
//!
//! let cache = RenderCache::new(NonZeroUsize::new(2).unwrap(), Arc::new(Upper));
//! let first = cache.render("guide.md", "hello");
//! let second = cache.render("guide.md", "hello");
//! assert!(!first.from_cache);
//! assert!(second.from_cache);
//! assert_eq!(&*second.markup, "HELLO");
//! ```

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

/// Default maximum number of cached documents.
pub const DEFAULT_CAPACITY: NonZeroUsize = NonZeroUsize::new(500).unwrap();

/// Turns raw document text into markup.
///
/// Implementations must be pure: the same input always yields the same output.
pub trait Converter: Send + Sync {
    /// Convert raw document text to markup.
    fn to_markup(&self, raw: &str) -> String;
}

/// Markup returned by [`RenderCache::render`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    /// Rendered markup.
    pub markup: Arc<str>,
    /// Whether the markup was served from cache.
    pub from_cache: bool,
}

/// Capacity-bounded LRU cache of rendered markup keyed by document path.
///
/// All operations take a short internal lock; conversion on a miss runs
/// outside the lock.
pub struct RenderCache {
    entries: Mutex<LruCache<String, Arc<str>>>,
    converter: Arc<dyn Converter>,
}

impl RenderCache {
    /// Create an empty cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: NonZeroUsize, converter: Arc<dyn Converter>) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            converter,
        }
    }

    /// Look up cached markup and mark it most recently used.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Insert or replace markup, evicting the least recently used entry when full.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn put(&self, key: &str, markup: impl Into<Arc<str>>) {
        let evicted = self
            .entries
            .lock()
            .unwrap()
            .push(key.to_owned(), markup.into());
        if let Some((evicted_key, _)) = evicted.filter(|(k, _)| k != key) {
            tracing::debug!(key = %evicted_key, "Evicted rendered document");
        }
    }

    /// Drop every entry.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Render `raw` for `path`, converting only on a cache miss.
    ///
    /// Empty markup is returned but never cached.
    pub fn render(&self, path: &str, raw: &str) -> Rendered {
        if let Some(markup) = self.get(path) {
            return Rendered {
                markup,
                from_cache: true,
            };
        }

        let markup: Arc<str> = self.converter.to_markup(raw).into();
        if !markup.is_empty() {
            self.put(path, Arc::clone(&markup));
        }
        Rendered {
            markup,
            from_cache: false,
        }
    }

    /// Number of cached entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// True if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.entries.lock().unwrap().cap()
    }
}
