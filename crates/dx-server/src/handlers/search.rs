//! Search API endpoint.
//!
//! Accepts `{"name": query, "type": "title" | "full"}` as JSON or as an
//! urlencoded form and answers with `{"data": [...]}`. A missing `type`
//! means full-text search.

use std::sync::Arc;

use axum::extract::{Form, FromRequest, Request, State};
use axum::http::header;
use axum::Json;
use dx_search::{FullHit, TitleHit};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::handlers::to_url_path;
use crate::state::AppState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SearchKind {
    Title,
    #[default]
    Full,
}

/// Body of POST /api/search.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchRequest {
    /// Query text.
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: SearchKind,
}

impl<S: Send + Sync> FromRequest<S> for SearchRequest {
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            let Json(body) = Json::<Self>::from_request(req, state)
                .await
                .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            Ok(body)
        } else {
            let Form(body) = Form::<Self>::from_request(req, state)
                .await
                .map_err(|e| ServerError::BadRequest(e.body_text()))?;
            Ok(body)
        }
    }
}

/// Response for POST /api/search.
#[derive(Debug, Serialize)]
pub(crate) struct SearchResponse {
    data: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
struct SearchHit {
    path: String,
    title: String,
    /// Snippet around the matches (full-text search only).
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matches: Option<usize>,
}

impl From<TitleHit> for SearchHit {
    fn from(hit: TitleHit) -> Self {
        Self {
            path: to_url_path(&hit.path),
            title: hit.title,
            content: None,
            matches: None,
        }
    }
}

impl From<FullHit> for SearchHit {
    fn from(hit: FullHit) -> Self {
        Self {
            path: to_url_path(&hit.path),
            title: hit.title,
            content: Some(hit.snippet),
            matches: Some(hit.matches),
        }
    }
}

/// Handle POST /api/search.
pub(crate) async fn search(
    State(state): State<Arc<AppState>>,
    request: SearchRequest,
) -> Json<SearchResponse> {
    let data: Vec<SearchHit> = match request.kind {
        SearchKind::Title => state
            .site
            .search_title(&request.name)
            .into_iter()
            .map(SearchHit::from)
            .collect(),
        SearchKind::Full => state
            .site
            .search_full(&request.name)
            .into_iter()
            .map(SearchHit::from)
            .collect(),
    };
    tracing::debug!(query = %request.name, kind = ?request.kind, hits = data.len(), "Search");
    Json(SearchResponse { data })
}
