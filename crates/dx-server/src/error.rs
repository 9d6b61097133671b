//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dx_site::{DocumentError, RefreshError};
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Document not found at the given path.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Refresh or rebuild failed; the previous site is still served.
    #[error("Refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// Malformed request body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Background task panicked or was cancelled.
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<DocumentError> for ServerError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound(path) => Self::DocumentNotFound(path),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::DocumentNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Document not found", "path": path}),
            ),
            Self::Refresh(e) => (
                StatusCode::BAD_GATEWAY,
                json!({"error": e.to_string()}),
            ),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({"error": message}),
            ),
            Self::Task(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_not_found_is_404() {
        let response = ServerError::from(DocumentError::NotFound("a.md".to_owned())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bad_request_is_400() {
        let response = ServerError::BadRequest("missing name".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
