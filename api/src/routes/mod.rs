use chrono::Utc;
use sovereign_core::audit::NewAuditLog;

use crate::error::AppError;
use crate::storage::Storage;

pub mod agents;
pub mod ai;
pub mod audit;
pub mod campaigns;
pub mod contracts;
pub mod dashboard;
pub mod decisions;
pub mod health;
pub mod leads;
pub mod time_entries;

pub(crate) async fn record_audit(storage: &dyn Storage, log: NewAuditLog) -> Result<(), AppError> {
    let log = log.into_audit_log(sovereign_core::new_id(), Utc::now());
    tracing::info!(
        user_id = %log.user_id,
        action = %log.action,
        entity_type = %log.entity_type,
        entity_id = log.entity_id.as_deref().unwrap_or(""),
        "audit"
    );
    storage.create_audit_log(log).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::ai::AiService;
    use crate::config::AppConfig;
    use crate::state::AppState;
    use crate::storage::MemoryStorage;

    pub const DEMO_USER: &str = "demo-user-id";

    pub fn state() -> AppState {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SOVEREIGN_STORAGE", "memory"),
            ("SOVEREIGN_STREAM_DELAY_MS", "0"),
            ("SOVEREIGN_RATE_LIMIT", "false"),
        ]);
        let config = AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
            .expect("test config should parse");
        AppState::new(
            Arc::new(MemoryStorage::new()),
            AiService::mock(config.timezone),
            config,
        )
    }

    pub fn app(state: AppState) -> Router {
        crate::app::build_router(state)
    }

    pub async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).expect("request should build"))
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        (
            status,
            headers,
            String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
        )
    }

    /// Sends a request and parses the response body as JSON (`Null` when empty).
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, text) = send_raw(app, method, uri, body).await;
        let json = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).expect("response should be JSON")
        };
        (status, json)
    }
}
