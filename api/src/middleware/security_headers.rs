use axum::extract::Request;
use axum::http::{HeaderValue, header};
use axum::middleware::Next;
use axum::response::Response;

/// Baseline security headers on every response. JSON under `/api/` is
/// per-user, so it is also marked `no-store` unless the handler set its own
/// cache policy (SSE does).
pub async fn apply(req: Request, next: Next) -> Response {
    let is_api = req.uri().path().starts_with("/api/");
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    if is_api && !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    response
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::routing::get;
    use axum::{Router, middleware};
    use tower::ServiceExt;

    async fn ok() -> StatusCode {
        StatusCode::OK
    }

    async fn cached() -> ([(header::HeaderName, &'static str); 1], StatusCode) {
        ([(header::CACHE_CONTROL, "no-cache")], StatusCode::OK)
    }

    fn app() -> Router {
        Router::new()
            .route("/health", get(ok))
            .route("/api/agents", get(ok))
            .route("/api/ai/chat/stream", get(cached))
            .layer(middleware::from_fn(super::apply))
    }

    async fn headers_for(uri: &str) -> axum::http::HeaderMap {
        app()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed")
            .headers()
            .clone()
    }

    #[tokio::test]
    async fn apply_adds_security_headers() {
        let headers = headers_for("/health").await;
        assert_eq!(
            headers
                .get("x-content-type-options")
                .expect("x-content-type-options header should exist"),
            "nosniff"
        );
        assert_eq!(
            headers
                .get("referrer-policy")
                .expect("referrer-policy header should exist"),
            "strict-origin-when-cross-origin"
        );
        assert_eq!(
            headers
                .get("x-frame-options")
                .expect("x-frame-options header should exist"),
            "DENY"
        );
        assert!(headers.get("cache-control").is_none());
    }

    #[tokio::test]
    async fn api_responses_are_not_stored() {
        let headers = headers_for("/api/agents").await;
        assert_eq!(
            headers.get("cache-control").expect("cache-control header should exist"),
            "no-store"
        );
    }

    #[tokio::test]
    async fn handler_cache_policy_wins() {
        let headers = headers_for("/api/ai/chat/stream").await;
        assert_eq!(
            headers.get("cache-control").expect("cache-control header should exist"),
            "no-cache"
        );
    }
}
