//! Root redirect.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Redirect;

use crate::handlers::to_url_path;
use crate::state::AppState;

/// Handle GET /: redirect to the configured index document.
pub(crate) async fn redirect_to_index(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&format!("/api/pages{}", to_url_path(&state.index)))
}
