//! Quick eight-dimension analysis of an M&V plan. The model's reply is
//! forwarded without rescoring.

mod prompt;

pub use prompt::{analysis_prompt, DIMENSIONS, FLAGS};

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::config::IntakeConfig;
use crate::error::AppError;
use crate::workflows::intake::{
    method_not_allowed, submission_or_default, validated_content, ContentSubmission, IntakeError,
};
use crate::workflows::provider::{ModelGateway, ModelRequest, ProviderError, ProviderReply};

pub const ANALYSIS_ROUTE: &str = "/api/analyze";
pub const ANALYSIS_MAX_TOKENS: u32 = 1000;

pub struct AnalysisService<G> {
    gateway: Arc<G>,
    prompt: String,
    intake: IntakeConfig,
}

impl<G> AnalysisService<G>
where
    G: ModelGateway + 'static,
{
    pub fn new(gateway: Arc<G>, intake: IntakeConfig) -> Self {
        Self {
            gateway,
            prompt: analysis_prompt(),
            intake,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn analyze(
        &self,
        submission: &ContentSubmission,
    ) -> Result<ProviderReply, AnalysisError> {
        if !self.gateway.is_configured() {
            return Err(ProviderError::MissingCredential.into());
        }

        let content = validated_content(submission, self.intake)?;
        let reply = self
            .gateway
            .complete(ModelRequest {
                system: self.prompt.clone(),
                user_content: content,
                max_tokens: ANALYSIS_MAX_TOKENS,
            })
            .await?;

        info!(status = reply.status, "analysis reply forwarded");
        Ok(reply)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub fn analysis_router<G>(service: Arc<AnalysisService<G>>) -> Router
where
    G: ModelGateway + 'static,
{
    Router::new()
        .route(
            ANALYSIS_ROUTE,
            post(analyze_handler::<G>).fallback(method_not_allowed),
        )
        .with_state(service)
}

async fn analyze_handler<G>(
    State(service): State<Arc<AnalysisService<G>>>,
    payload: Result<Json<ContentSubmission>, JsonRejection>,
) -> Result<Response, AppError>
where
    G: ModelGateway + 'static,
{
    let submission = submission_or_default(payload);
    let reply = service.analyze(&submission).await?;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(reply.body)).into_response())
}
