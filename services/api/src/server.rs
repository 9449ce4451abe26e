use crate::cli::ServeArgs;
use crate::infra::{load_rubric, AppState};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mnv_scorecard::config::AppConfig;
use mnv_scorecard::error::AppError;
use mnv_scorecard::telemetry;
use mnv_scorecard::workflows::analysis::AnalysisService;
use mnv_scorecard::workflows::compliance::ComplianceEvaluationService;
use mnv_scorecard::workflows::provider::{AnthropicGateway, ModelGateway};
use mnv_scorecard::workflows::source::UrlTextFetcher;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let rubric = load_rubric(&config.rubric)?;

    let gateway = Arc::new(AnthropicGateway::new(&config.provider)?);
    if !gateway.is_configured() {
        warn!("ANTHROPIC_API_KEY is not set; model-backed endpoints will return 500");
    }
    let fetcher = Arc::new(UrlTextFetcher::new(config.provider.timeout)?);

    let compliance = Arc::new(ComplianceEvaluationService::new(
        gateway.clone(),
        rubric,
        config.intake,
    ));
    let analysis = Arc::new(AnalysisService::new(gateway.clone(), config.intake));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_workflow_routes(compliance, analysis, fetcher)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        model = gateway.model(),
        max_input_chars = config.intake.max_input_chars,
        "mnv scorecard service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
