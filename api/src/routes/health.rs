use axum::Router;
use axum::routing::get;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Liveness probe; does not touch storage.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Process is up", body = String, content_type = "text/plain")),
    tag = "system"
)]
pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::routes::test_support::{app, send_raw, state};

    #[tokio::test]
    async fn health_is_plain_ok() {
        let app = app(state());
        let (status, _, body) = send_raw(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}
