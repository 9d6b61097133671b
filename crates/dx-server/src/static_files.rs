//! Asset serving from the document root.
//!
//! Images and other files referenced by documents are served as they are.
//! Dot-entries (`.git`, `.dx`) and directories the site ignores are never
//! exposed.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::error::ServerError;
use crate::state::AppState;

/// Fallback handler: serve a file below the document root.
pub(crate) async fn serve_asset(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let path = req.uri().path().to_owned();
    let decoded = percent_decode_str(&path).decode_utf8_lossy();
    if is_hidden(&decoded) || state.site.excludes(&decoded) {
        tracing::debug!(path = %decoded, "Refusing asset outside the published tree");
        return ServerError::DocumentNotFound(path).into_response();
    }

    let result = ServeDir::new(&state.source_dir).oneshot(req).await;
    match result {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => {
            ServerError::DocumentNotFound(path).into_response()
        }
        Ok(response) => response.map(Body::new).into_response(),
        Err(never) => match never {},
    }
}

/// Whether any segment of a decoded URL path names a dot-entry.
fn is_hidden(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('.'))
}
