//! Pages API endpoint.
//!
//! Renders a document and returns it as JSON with its title and breadcrumbs.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use dx_site::RenderedDocument;
use dx_tree::BreadcrumbItem;
use md5::{Digest, Md5};
use serde::Serialize;

use crate::error::ServerError;
use crate::handlers::to_url_path;
use crate::state::AppState;

/// Response for GET /api/pages/{path}.
#[derive(Serialize)]
struct PageResponse {
    meta: PageMeta,
    breadcrumbs: Vec<BreadcrumbResponse>,
    /// Rendered markup.
    content: String,
}

#[derive(Serialize)]
struct PageMeta {
    title: String,
    /// URL path.
    path: String,
    /// Site generation the page was rendered from.
    generation: u64,
}

#[derive(Serialize)]
struct BreadcrumbResponse {
    title: String,
    path: String,
}

impl From<BreadcrumbItem> for BreadcrumbResponse {
    fn from(item: BreadcrumbItem) -> Self {
        Self {
            title: item.title,
            path: to_url_path(&item.path),
        }
    }
}

impl From<RenderedDocument> for PageResponse {
    fn from(doc: RenderedDocument) -> Self {
        Self {
            meta: PageMeta {
                title: doc.title,
                path: to_url_path(&doc.path),
                generation: doc.generation,
            },
            breadcrumbs: doc
                .breadcrumbs
                .into_iter()
                .map(BreadcrumbResponse::from)
                .collect(),
            content: String::from(&*doc.content),
        }
    }
}

/// Handle GET /api/pages/{path}.
pub(crate) async fn get_page(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let doc = state.site.document(&path)?;
    tracing::debug!(path = %doc.path, from_cache = doc.from_cache, "Page served");

    let etag = compute_etag(&state.version, &doc.content);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        Json(PageResponse::from(doc)),
    )
        .into_response())
}

/// Compute `ETag` from version and content.
///
/// MD5 truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_etag_includes_version() {
        assert_ne!(
            compute_etag("1.0.0", "content"),
            compute_etag("1.0.1", "content")
        );
    }

    #[test]
    fn test_compute_etag_includes_content() {
        assert_ne!(
            compute_etag("1.0.0", "content1"),
            compute_etag("1.0.0", "content2")
        );
    }

    #[test]
    fn test_compute_etag_format() {
        let etag = compute_etag("1.0.0", "content");

        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag.len(), 18);
    }

    #[test]
    fn test_page_response_uses_url_paths() {
        let doc = RenderedDocument {
            path: "guide/setup.md".to_owned(),
            title: "Setup".to_owned(),
            breadcrumbs: vec![BreadcrumbItem {
                title: "Guide".to_owned(),
                path: "guide".to_owned(),
            }],
            content: Arc::from("<h1>Setup</h1>"),
            from_cache: false,
            generation: 2,
        };

        let json = serde_json::to_value(PageResponse::from(doc)).unwrap();

        assert_eq!(json["meta"]["title"], "Setup");
        assert_eq!(json["meta"]["path"], "/guide/setup.md");
        assert_eq!(json["meta"]["generation"], 2);
        assert_eq!(json["breadcrumbs"][0]["path"], "/guide");
        assert_eq!(json["content"], "<h1>Setup</h1>");
    }
}
