//! Response headers that keep served documents inert.
//!
//! HTML documents and assets come straight from the document root, so the
//! headers forbid scripts, framing, MIME sniffing and leaking the reader's
//! location to outbound links.

use axum::http::HeaderValue;
use axum::http::header::{
    CONTENT_SECURITY_POLICY, HeaderName, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
};
use tower_http::set_header::SetResponseHeaderLayer;

/// Documents may embed their own images and inline styles, never scripts.
const CSP: &str = "default-src 'self'; \
                   script-src 'none'; \
                   object-src 'none'; \
                   style-src 'self' 'unsafe-inline'; \
                   img-src 'self' data:; \
                   frame-ancestors 'none'";

/// One overriding layer per security header.
pub(crate) fn header_layers() -> impl Iterator<Item = SetResponseHeaderLayer<HeaderValue>> {
    let headers: [(HeaderName, &'static str); 4] = [
        (CONTENT_SECURITY_POLICY, CSP),
        (X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (X_FRAME_OPTIONS, "DENY"),
        (REFERRER_POLICY, "no-referrer"),
    ];
    headers.into_iter().map(|(name, value)| {
        SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
    })
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        header_layers().fold(
            Router::new().route(
                "/page",
                get(|| async { ([(CONTENT_SECURITY_POLICY, "script-src *")], "<p>page</p>") }),
            ),
            |router, layer| router.layer(layer),
        )
    }

    #[tokio::test]
    async fn test_headers_override_document_policy() {
        let response = app()
            .oneshot(Request::get("/page").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers[CONTENT_SECURITY_POLICY], CSP);
        assert_eq!(headers[X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[REFERRER_POLICY], "no-referrer");
    }

    #[tokio::test]
    async fn test_headers_on_not_found() {
        let response = app()
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[X_FRAME_OPTIONS], "DENY");
    }

    #[test]
    fn test_csp_blocks_scripts_and_plugins() {
        assert!(CSP.contains("script-src 'none'"));
        assert!(CSP.contains("object-src 'none'"));
    }
}
