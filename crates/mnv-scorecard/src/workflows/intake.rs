//! Validation shared by every endpoint that forwards plan text to the model.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::IntakeConfig;

/// Request body `{ "content": "..." }`. `content` is kept untyped so a
/// non-string value is reported as missing content rather than a decode
/// failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentSubmission {
    #[serde(default)]
    pub content: Option<Value>,
}

impl ContentSubmission {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(Value::String(content.into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Content is required")]
    MissingContent,
    #[error("Input too long. Please shorten your text.")]
    TooLong { length: usize, limit: usize },
}

/// Returns the trimmed content. The length ceiling applies to the text as
/// submitted, before trimming.
pub fn validated_content(
    submission: &ContentSubmission,
    limits: IntakeConfig,
) -> Result<String, IntakeError> {
    let raw = submission
        .content
        .as_ref()
        .and_then(Value::as_str)
        .ok_or(IntakeError::MissingContent)?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IntakeError::MissingContent);
    }

    let length = raw.chars().count();
    if length > limits.max_input_chars {
        return Err(IntakeError::TooLong {
            length,
            limit: limits.max_input_chars,
        });
    }

    Ok(trimmed.to_string())
}

/// Unwraps an optional JSON extraction, turning a malformed body into the
/// same 400 a missing field would produce.
pub fn submission_or_default(
    payload: Result<Json<ContentSubmission>, JsonRejection>,
) -> ContentSubmission {
    match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "request body rejected");
            ContentSubmission::default()
        }
    }
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Fallback for every API route that only accepts POST.
pub async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
