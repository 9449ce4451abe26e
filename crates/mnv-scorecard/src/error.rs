use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::analysis::AnalysisError;
use crate::workflows::compliance::{EvaluationError, RubricError};
use crate::workflows::intake::{error_response, IntakeError};
use crate::workflows::provider::ProviderError;
use crate::workflows::source::SourceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;
use tracing::error;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Intake(IntakeError),
    Rubric(RubricError),
    Provider(ProviderError),
    Source(SourceError),
    Json(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Intake(err) => write!(f, "invalid input: {}", err),
            AppError::Rubric(err) => write!(f, "rubric error: {}", err),
            AppError::Provider(err) => write!(f, "provider error: {}", err),
            AppError::Source(err) => write!(f, "source error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Intake(err) => Some(err),
            AppError::Rubric(err) => Some(err),
            AppError::Provider(err) => Some(err),
            AppError::Source(err) => Some(err),
            AppError::Json(err) => Some(err),
        }
    }
}

/// Bodies are `{ "error": message }`. Workflow errors carry their own
/// client-facing text; provider and rubric details stay in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Intake(err) => error_response(StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Provider(err) => {
                error!(error = %err, "model request failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, err.client_message())
            }
            AppError::Rubric(err) => {
                error!(error = %err, "compliance prompt could not be built");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Rubric configuration is invalid",
                )
            }
            AppError::Source(err) => {
                let status = match &err {
                    SourceError::MissingUrl | SourceError::InvalidUrl => StatusCode::BAD_REQUEST,
                    SourceError::Upstream { status, .. } => {
                        StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                    }
                    SourceError::Transport(_) => {
                        error!(error = %err, "URL fetch failed");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                error_response(status, err.to_string())
            }
            AppError::Json(_) => error_response(StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) | AppError::Server(_) => {
                error_response(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<IntakeError> for AppError {
    fn from(value: IntakeError) -> Self {
        Self::Intake(value)
    }
}

impl From<RubricError> for AppError {
    fn from(value: RubricError) -> Self {
        Self::Rubric(value)
    }
}

impl From<ProviderError> for AppError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<SourceError> for AppError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<EvaluationError> for AppError {
    fn from(value: EvaluationError) -> Self {
        match value {
            EvaluationError::Intake(err) => Self::Intake(err),
            EvaluationError::Provider(err) => Self::Provider(err),
            EvaluationError::Rubric(err) => Self::Rubric(err),
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(value: AnalysisError) -> Self {
        match value {
            AnalysisError::Intake(err) => Self::Intake(err),
            AnalysisError::Provider(err) => Self::Provider(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn error_body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn provider_errors_hide_transport_details() {
        let (status, body) = error_body(ProviderError::Config("bad base url".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Provider is not configured correctly" }));
    }

    #[tokio::test]
    async fn invalid_urls_are_client_errors_without_prefix() {
        let (status, body) = error_body(SourceError::MissingUrl.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "URL is required" }));
    }

    #[tokio::test]
    async fn upstream_fetch_status_is_mirrored() {
        let err = SourceError::Upstream {
            status: 404,
            reason: "Not Found".to_string(),
        };
        let (status, body) = error_body(err.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Failed to fetch URL: Not Found" }));
    }

    #[tokio::test]
    async fn evaluation_errors_map_to_their_layer() {
        let (status, body) = error_body(
            EvaluationError::Intake(IntakeError::TooLong {
                length: 15_001,
                limit: 15_000,
            })
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Input too long. Please shorten your text." }));

        let (status, body) = error_body(
            EvaluationError::Rubric(RubricError::Malformed("no principles".into())).into(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Rubric configuration is invalid" }));

        let (status, body) =
            error_body(AnalysisError::Provider(ProviderError::MissingCredential).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "ANTHROPIC_API_KEY not configured" }));
    }

    #[test]
    fn display_names_the_failing_layer() {
        let err = AppError::from(RubricError::Malformed("principle 'accuracy' has no criteria".into()));
        assert_eq!(
            err.to_string(),
            "rubric error: malformed rubric: principle 'accuracy' has no criteria"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
