use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use mnv_scorecard::workflows::analysis::{analysis_router, AnalysisService};
use mnv_scorecard::workflows::compliance::{compliance_router, ComplianceEvaluationService};
use mnv_scorecard::workflows::provider::ModelGateway;
use mnv_scorecard::workflows::source::{source_router, UrlTextFetcher};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_workflow_routes<G>(
    compliance: Arc<ComplianceEvaluationService<G>>,
    analysis: Arc<AnalysisService<G>>,
    fetcher: Arc<UrlTextFetcher>,
) -> Router
where
    G: ModelGateway + 'static,
{
    compliance_router(compliance)
        .merge(analysis_router(analysis))
        .merge(source_router(fetcher))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
