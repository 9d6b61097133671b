//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use dx_site::Site;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Documentation site with the current published generation.
    pub(crate) site: Arc<Site>,
    /// Document root, also the root for asset requests.
    pub(crate) source_dir: PathBuf,
    /// Document `/` redirects to.
    pub(crate) index: String,
    /// Whether `/api/update` pulls before rebuilding.
    pub(crate) update_enabled: bool,
    /// Application version, mixed into `ETag`s.
    pub(crate) version: String,
}
