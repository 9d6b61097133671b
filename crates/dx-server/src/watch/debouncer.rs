//! Change batching for the filesystem watcher.
//!
//! Editors and `git checkout` emit bursts of events. The debouncer collects
//! changed paths and releases them as one batch once the tree has been quiet
//! for a while, so a burst costs a single rebuild.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Pending {
    paths: BTreeSet<PathBuf>,
    first: Option<Instant>,
    last: Option<Instant>,
}

/// Thread-safe trailing debouncer.
pub(crate) struct ChangeDebouncer {
    pending: Mutex<Pending>,
    quiet: Duration,
    /// Upper bound on how long a continuous stream of events can defer a batch.
    max_delay: Duration,
}

impl ChangeDebouncer {
    pub(crate) fn new(quiet: Duration) -> Self {
        Self {
            pending: Mutex::new(Pending::default()),
            quiet,
            max_delay: quiet * 10,
        }
    }

    /// Record a changed path.
    pub(crate) fn record(&self, path: PathBuf) {
        self.record_at(path, Instant::now());
    }

    fn record_at(&self, path: PathBuf, now: Instant) {
        let mut pending = self.pending.lock().unwrap();
        pending.paths.insert(path);
        pending.first.get_or_insert(now);
        pending.last = Some(now);
    }

    /// Take the pending batch if it is ready.
    ///
    /// Returns `None` while nothing changed or events are still arriving.
    pub(crate) fn take_ready(&self) -> Option<Vec<PathBuf>> {
        self.take_ready_at(Instant::now())
    }

    fn take_ready_at(&self, now: Instant) -> Option<Vec<PathBuf>> {
        let mut pending = self.pending.lock().unwrap();
        let (first, last) = (pending.first?, pending.last?);

        let quiet = now.duration_since(last) >= self.quiet;
        let overdue = now.duration_since(first) >= self.max_delay;
        if !quiet && !overdue {
            return None;
        }

        let batch = std::mem::take(&mut *pending);
        Some(batch.paths.into_iter().collect())
    }
}
