use metrics_exporter_prometheus::PrometheusHandle;
use mnv_scorecard::config::RubricSources;
use mnv_scorecard::workflows::compliance::{RubricError, RubricStore};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the rubric from the configured overrides or the embedded copies.
pub(crate) fn load_rubric(sources: &RubricSources) -> Result<Arc<RubricStore>, RubricError> {
    let rubric = RubricStore::from_sources(sources)?;
    info!(
        principles = rubric.principle_count(),
        criteria = rubric.criterion_count(),
        elements = rubric.element_count(),
        max_possible = rubric.max_possible(),
        custom_principles = sources.principles_path.is_some(),
        custom_checklist = sources.checklist_path.is_some(),
        "rubric loaded"
    );
    Ok(Arc::new(rubric))
}
