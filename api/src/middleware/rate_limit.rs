use axum::Json;
use axum::http::{HeaderValue, Response, StatusCode, header};
use axum::response::IntoResponse;
use sovereign_core::error::{ApiError, codes};
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder,
    key_extractor::SmartIpKeyExtractor,
};

type RateLimitLayer =
    GovernorLayer<SmartIpKeyExtractor, governor::middleware::NoOpMiddleware, axum::body::Body>;

/// Rate limit for /api/ai/*: 30 requests per minute per IP, bursts of 10.
///
/// `None` only if the governor rejects the quota, which the constants here
/// never trigger.
pub fn ai_layer() -> Option<RateLimitLayer> {
    let config = GovernorConfigBuilder::default()
        .per_second(2) // 30 per minute replenish
        .burst_size(10)
        .key_extractor(SmartIpKeyExtractor)
        .finish()?;
    Some(GovernorLayer::new(config).error_handler(json_error_handler))
}

/// Renders governor rejections in the shared `ApiError` shape, with
/// `Retry-After` when the wait is known.
fn json_error_handler(err: GovernorError) -> Response<axum::body::Body> {
    let (status, retry_after, message) = match err {
        GovernorError::TooManyRequests { wait_time, .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            Some(wait_time),
            format!("Too many requests. Retry after {wait_time} seconds."),
        ),
        GovernorError::UnableToExtractKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
            "Unable to determine client identity for rate limiting".to_string(),
        ),
        GovernorError::Other { code, msg, .. } => {
            (code, None, msg.unwrap_or_default().to_string())
        }
    };

    let request_id = uuid::Uuid::now_v7().to_string();
    tracing::warn!(request_id = %request_id, status = %status, "rate limit rejection");

    let body = ApiError {
        error: codes::RATE_LIMITED.to_string(),
        message,
        field: None,
        details: Vec::new(),
        request_id,
        docs_hint: None,
    };

    let mut response = (status, Json(body)).into_response();
    if let Some(wait) = retry_after {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(wait));
    }
    response
}
