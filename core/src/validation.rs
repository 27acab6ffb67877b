//! Field-level validation for request payloads.
//!
//! Deserialization already guarantees shape and types; `Validate` covers the
//! rules serde cannot express (non-empty names, numeric ranges, index bounds).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One offending field in a rejected payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub trait Validate {
    /// Returns every rule violation; an empty vec means the payload is acceptable.
    fn validate(&self) -> Vec<FieldIssue>;
}

pub fn require_non_empty(issues: &mut Vec<FieldIssue>, field: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push(FieldIssue::new(field, format!("{field} must not be empty")));
    }
}

pub(crate) fn require_optional_non_empty(
    issues: &mut Vec<FieldIssue>,
    field: &str,
    value: Option<&str>,
) {
    if let Some(value) = value {
        require_non_empty(issues, field, value);
    }
}

pub(crate) fn require_non_negative(issues: &mut Vec<FieldIssue>, field: &str, value: i32) {
    if value < 0 {
        issues.push(FieldIssue::new(field, format!("{field} must be >= 0")));
    }
}

pub(crate) fn require_optional_non_negative(
    issues: &mut Vec<FieldIssue>,
    field: &str,
    value: Option<i32>,
) {
    if let Some(value) = value {
        require_non_negative(issues, field, value);
    }
}

/// Decimal strings such as "12.5"; stored as NUMERIC.
pub(crate) fn require_decimal(issues: &mut Vec<FieldIssue>, field: &str, value: &str) {
    let trimmed = value.trim();
    let valid = !trimmed.is_empty()
        && trimmed.parse::<f64>().map(f64::is_finite).unwrap_or(false)
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-');
    if !valid {
        issues.push(FieldIssue::new(
            field,
            format!("{field} must be a decimal number such as \"12.5\""),
        ));
    }
}
