//! HTTP server for DX documentation sites.
//!
//! Serves a [`Site`] over axum:
//! - `GET /`: redirect to the index document
//! - `GET /api/navigation`: navigation tree
//! - `GET /api/pages/{path}`: rendered document with breadcrumbs
//! - `POST /api/search`: title or full-text search
//! - `GET|POST /api/update`: pull new content and republish
//! - anything else: files from the document root
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum router (dx-server)
//!                      │
//!                      ├─► API handlers ──► Site (tree, search, render cache)
//!                      │
//!                      ├─► /api/update ──► spawn_blocking(Site::refresh)
//!                      │
//!                      ├─► notify watcher ──► spawn_blocking(Site::rebuild)
//!                      │
//!                      └─► ServeDir (document root assets)
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod static_files;
mod watch;

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use dx_search::{FileSnapshotStore, SearchConfig};
use dx_site::{CommandUpdater, Site, SiteConfig};
use dx_tree::ScanError;
use state::AppState;

pub use error::ServerError;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Document root, also served for assets.
    pub source_dir: PathBuf,
    /// Document `/` redirects to.
    pub index: String,
    /// Whether `/api/update` pulls before rebuilding.
    pub update_enabled: bool,
    /// Rebuild on filesystem changes.
    pub watch: bool,
    /// Files the server writes itself, ignored by the watcher.
    pub ignored_paths: Vec<PathBuf>,
    /// Application version (mixed into `ETag`s).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8910,
            source_dir: PathBuf::from("docs"),
            index: "readme.md".to_owned(),
            update_enabled: true,
            watch: false,
            ignored_paths: Vec::new(),
            version: String::new(),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address is invalid, the port cannot be bound, or
/// the watcher cannot be started.
pub async fn run_server(
    config: ServerConfig,
    site: Arc<Site>,
) -> Result<(), Box<dyn std::error::Error>> {
    let _watcher = if config.watch {
        let filter = watch::ChangeFilter::new(&site, &config.ignored_paths);
        Some(watch::SiteWatcher::start(Arc::clone(&site), filter)?)
    } else {
        None
    };

    let state = Arc::new(AppState {
        site,
        source_dir: config.source_dir,
        index: config.index,
        update_enabled: config.update_enabled,
        version: config.version,
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from DX config.
#[must_use]
pub fn server_config_from_dx_config(config: &dx_config::Config, version: String) -> ServerConfig {
    let snapshot = &config.search_resolved.snapshot_path;
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        source_dir: config.docs_resolved.source_dir.clone(),
        index: config.docs_resolved.index.clone(),
        update_enabled: config.update.enabled,
        watch: config.docs_resolved.watch,
        ignored_paths: vec![snapshot.clone(), snapshot.with_extension("tmp")],
        version,
    }
}

/// Create site configuration from DX config.
#[must_use]
pub fn site_config_from_dx_config(config: &dx_config::Config) -> SiteConfig {
    let docs = &config.docs_resolved;
    let search = &config.search_resolved;
    SiteConfig {
        source_dir: docs.source_dir.clone(),
        names_file: docs.names_file.clone(),
        ignore_dirs: docs.ignore_dirs.clone(),
        extensions: docs.extensions.clone(),
        skip_hidden: docs.skip_hidden,
        sibling_order: docs.sibling_order,
        cache_capacity: NonZeroUsize::new(config.cache.capacity)
            .unwrap_or(dx_cache::DEFAULT_CAPACITY),
        search: SearchConfig {
            match_depth: search.match_depth,
            match_width: search.match_width,
            max_results: search.max_results,
        },
    }
}

/// Open the site described by a DX config.
///
/// The update command runs in the document root; the search index is
/// persisted to the configured snapshot path.
///
/// # Errors
///
/// Returns [`ScanError`] if the document root cannot be scanned.
pub fn open_site(config: &dx_config::Config) -> Result<Site, ScanError> {
    let site_config = site_config_from_dx_config(config);
    let builder = Site::builder(site_config).with_snapshot_store(Arc::new(
        FileSnapshotStore::new(config.search_resolved.snapshot_path.clone()),
    ));

    let builder = match config.update.command.split_first() {
        Some((program, args)) => builder.with_updater(Arc::new(
            CommandUpdater::new(program.clone())
                .args(args.iter().cloned())
                .current_dir(config.docs_resolved.source_dir.clone())
                .timeout(config.update.timeout()),
        )),
        None => builder,
    };

    builder.open()
}
