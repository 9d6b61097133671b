//! Content update hook.
//!
//! Pulls new content (when enabled) and publishes a rebuilt site. The work
//! runs on the blocking pool; concurrent hooks are coalesced by the site.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Response for GET|POST /api/update.
#[derive(Debug, Serialize)]
pub(crate) struct UpdateResponse {
    /// Generation now being served.
    generation: u64,
    document_count: usize,
}

/// Handle GET|POST /api/update.
pub(crate) async fn update(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UpdateResponse>, ServerError> {
    let site = Arc::clone(&state.site);
    let pull = state.update_enabled;

    tokio::task::spawn_blocking(move || if pull { site.refresh() } else { site.rebuild() })
        .await??;

    let current = state.site.state();
    Ok(Json(UpdateResponse {
        generation: current.generation(),
        document_count: current.document_count(),
    }))
}
