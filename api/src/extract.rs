//! Custom extractors that convert axum rejections to structured AppError responses.
//!
//! Use `AppJson<T>` as a drop-in replacement for `axum::Json<T>` in handler signatures.
//! Unlike the standard extractor, deserialization failures produce a JSON `AppError`
//! naming the offending field instead of axum's default plain-text 422 response.
//! `ValidJson<T>` additionally runs the payload's `Validate` rules.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use sovereign_core::validation::{FieldIssue, Validate};

use crate::error::AppError;

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

/// JSON body that has passed both deserialization and `Validate`.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AppJson(value) = AppJson::<T>::from_request(req, state).await?;
        let issues = value.validate();
        if issues.is_empty() {
            Ok(ValidJson(value))
        } else {
            Err(AppError::validation(issues))
        }
    }
}

/// Convert a `JsonRejection` to a structured `AppError::Validation`.
pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();

    // "missing field `name`" → field = "name"
    // "unknown field `foo`" → field = "foo"
    let field_hint = extract_field_from_serde_message(&body_text);

    AppError::Validation {
        message: format!("Invalid request body: {body_text}"),
        details: vec![FieldIssue::new(
            field_hint.unwrap_or_else(|| "body".to_string()),
            body_text,
        )],
        docs_hint: Some(
            "Check the request body against the endpoint's schema (GET /api-doc/openapi.json)."
                .to_string(),
        ),
    }
}

fn extract_field_from_serde_message(msg: &str) -> Option<String> {
    for pattern in ["missing field `", "unknown field `"] {
        if let Some(start) = msg.find(pattern) {
            let after = &msg[start + pattern.len()..];
            if let Some(end) = after.find('`') {
                return Some(after[..end].to_string());
            }
        }
    }
    // axum prefixes type errors with the JSON path: "...target type: score: invalid type..."
    let rest = msg.split_once("target type: ")?.1;
    let (path, _) = rest.split_once(": ")?;
    (!path.is_empty() && !path.contains(' ')).then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_missing_field_name() {
        let msg = "Failed to deserialize the JSON body into the target type: missing field `goalMembers` at line 1 column 17";
        assert_eq!(
            extract_field_from_serde_message(msg),
            Some("goalMembers".to_string())
        );
    }

    #[test]
    fn extracts_unknown_field_name() {
        let msg = "unknown field `userId`, expected one of `name`, `status`";
        assert_eq!(
            extract_field_from_serde_message(msg),
            Some("userId".to_string())
        );
    }

    #[test]
    fn extracts_json_path_of_type_errors() {
        let msg = "Failed to deserialize the JSON body into the target type: score: invalid type: string \"high\", expected i32 at line 1 column 15";
        assert_eq!(
            extract_field_from_serde_message(msg),
            Some("score".to_string())
        );
    }

    #[test]
    fn returns_none_for_generic_error() {
        let msg = "invalid type: string, expected i32";
        assert_eq!(extract_field_from_serde_message(msg), None);
    }
}
