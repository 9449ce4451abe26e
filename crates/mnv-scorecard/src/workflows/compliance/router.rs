use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::service::ComplianceEvaluationService;
use crate::error::AppError;
use crate::workflows::intake::{method_not_allowed, submission_or_default, ContentSubmission};
use crate::workflows::provider::ModelGateway;

pub const COMPLIANCE_ROUTE: &str = "/api/compliance";

/// Router builder exposing the compliance evaluation endpoint.
pub fn compliance_router<G>(service: Arc<ComplianceEvaluationService<G>>) -> Router
where
    G: ModelGateway + 'static,
{
    Router::new()
        .route(
            COMPLIANCE_ROUTE,
            post(evaluate_handler::<G>).fallback(method_not_allowed),
        )
        .with_state(service)
}

pub(crate) async fn evaluate_handler<G>(
    State(service): State<Arc<ComplianceEvaluationService<G>>>,
    payload: Result<Json<ContentSubmission>, JsonRejection>,
) -> Result<Response, AppError>
where
    G: ModelGateway + 'static,
{
    let submission = submission_or_default(payload);
    let reply = service.evaluate(&submission).await?;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(reply.body)).into_response())
}
