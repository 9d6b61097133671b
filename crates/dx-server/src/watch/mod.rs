//! Rebuild the site when the document root changes on disk.
//!
//! Only used when no pull step is involved (local editing). Changes are
//! batched by [`ChangeDebouncer`] and each batch triggers one
//! [`Site::rebuild`] on the blocking pool.

mod debouncer;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dx_site::Site;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use debouncer::ChangeDebouncer;

/// Default quiet period before a batch of changes is applied.
const DEFAULT_QUIET_MS: u64 = 200;

/// Which changed paths matter for the site.
#[derive(Clone, Debug)]
pub(crate) struct ChangeFilter {
    source_dir: PathBuf,
    skip_hidden: bool,
    ignore_dirs: Vec<String>,
    /// Files written by the server itself (search snapshot).
    ignored: Vec<PathBuf>,
}

impl ChangeFilter {
    pub(crate) fn new(site: &Site, ignored: &[PathBuf]) -> Self {
        let config = site.config();
        // Watchers report resolved paths.
        Self {
            source_dir: canonical(&config.source_dir),
            skip_hidden: config.skip_hidden,
            ignore_dirs: config.ignore_dirs.clone(),
            ignored: ignored.iter().map(PathBuf::as_path).map(canonical).collect(),
        }
    }

    pub(crate) fn is_relevant(&self, path: &Path) -> bool {
        if self.ignored.iter().any(|p| path.starts_with(p)) {
            return false;
        }
        let Ok(relative) = path.strip_prefix(&self.source_dir) else {
            return false;
        };
        relative.components().all(|component| match component {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                !(self.skip_hidden && name.starts_with('.'))
                    && !self.ignore_dirs.iter().any(|d| *d == name)
            }
            _ => true,
        })
    }
}

/// Resolve symlinks, also for files that do not exist yet.
fn canonical(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => canonical(parent).join(name),
        _ => path.to_path_buf(),
    }
}

/// Keeps the filesystem watcher alive. Dropping it stops watching.
pub(crate) struct SiteWatcher {
    _watcher: RecommendedWatcher,
}

impl SiteWatcher {
    /// Start watching the site's document root.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn start(site: Arc<Site>, filter: ChangeFilter) -> Result<Self, notify::Error> {
        let (tx, mut rx) = mpsc::channel::<Event>(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                // Callback is sync
                Ok(event) => {
                    let _ = tx.blocking_send(event);
                }
                Err(e) => tracing::warn!(error = %e, "Filesystem watcher error"),
            }
        })?;
        watcher.watch(&filter.source_dir, RecursiveMode::Recursive)?;
        tracing::info!(path = %filter.source_dir.display(), "Watching for changes");

        let debouncer = Arc::new(ChangeDebouncer::new(Duration::from_millis(DEFAULT_QUIET_MS)));

        let recorder = Arc::clone(&debouncer);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    continue;
                }
                for path in event.paths {
                    if filter.is_relevant(&path) {
                        tracing::debug!(path = %path.display(), "Recorded change");
                        recorder.record(path);
                    }
                }
            }
        });

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(DEFAULT_QUIET_MS / 2));
            loop {
                interval.tick().await;
                let Some(batch) = debouncer.take_ready() else {
                    continue;
                };
                tracing::info!(changed = batch.len(), "Documents changed, rebuilding");

                let site = Arc::clone(&site);
                // Failures are reported by the site's alerter.
                if let Err(e) = tokio::task::spawn_blocking(move || site.rebuild()).await {
                    tracing::error!(error = %e, "Rebuild task failed");
                }
            }
        });

        Ok(Self { _watcher: watcher })
    }
}
