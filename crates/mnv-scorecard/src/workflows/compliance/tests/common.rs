use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::config::IntakeConfig;
use crate::workflows::compliance::rubric::{
    ChecklistElement, ChecklistScoring, Criterion, PlanChecklist, Principle, PrinciplesRubric,
    RubricStore,
};
use crate::workflows::compliance::{ComplianceEvaluationService, ScoringEngine};
use crate::workflows::provider::{ModelGateway, ModelRequest, ProviderError, ProviderReply};

/// Gateway that answers every call with the same reply and records requests.
pub(crate) struct ScriptedGateway {
    reply: ProviderReply,
    calls: Mutex<Vec<ModelRequest>>,
}

impl ScriptedGateway {
    pub(crate) fn new(reply: ProviderReply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<ModelRequest> {
        self.calls.lock().expect("calls mutex").clone()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, request: ModelRequest) -> Result<ProviderReply, ProviderError> {
        self.calls.lock().expect("calls mutex").push(request);
        Ok(self.reply.clone())
    }
}

/// Gateway without a credential.
#[derive(Default)]
pub(crate) struct UnconfiguredGateway;

#[async_trait]
impl ModelGateway for UnconfiguredGateway {
    fn is_configured(&self) -> bool {
        false
    }

    async fn complete(&self, _request: ModelRequest) -> Result<ProviderReply, ProviderError> {
        Err(ProviderError::MissingCredential)
    }
}

/// Gateway whose every call fails before reaching the provider.
#[derive(Default)]
pub(crate) struct BrokenGateway;

#[async_trait]
impl ModelGateway for BrokenGateway {
    async fn complete(&self, _request: ModelRequest) -> Result<ProviderReply, ProviderError> {
        Err(ProviderError::Config("client unavailable".to_string()))
    }
}

pub(crate) fn embedded_rubric() -> Arc<RubricStore> {
    Arc::new(RubricStore::embedded().expect("embedded rubric is valid"))
}

pub(crate) fn criterion(name: &str, weight: f64) -> Criterion {
    Criterion {
        name: name.to_string(),
        weight,
        met: format!("{name} fully documented"),
        partial: format!("{name} partly documented"),
        not_met: format!("{name} absent"),
    }
}

pub(crate) fn element(name: &str) -> ChecklistElement {
    ChecklistElement {
        name: name.to_string(),
        look_for: format!("{name} section"),
        present: format!("{name} complete"),
        partial: format!("{name} incomplete"),
        missing: format!("{name} absent"),
    }
}

pub(crate) fn principle(name: &str, criteria: &[(&str, f64)]) -> Principle {
    Principle {
        name: name.to_string(),
        description: format!("{name} of the plan"),
        criteria: criteria
            .iter()
            .map(|(id, weight)| (id.to_string(), criterion(id, *weight)))
            .collect(),
    }
}

pub(crate) fn checklist(element_ids: &[&str], max_possible: f64) -> PlanChecklist {
    PlanChecklist {
        version: None,
        elements: element_ids
            .iter()
            .map(|id| (id.to_string(), element(id)))
            .collect(),
        scoring: ChecklistScoring { max_possible },
    }
}

/// Two principles (weights 25/75 and 100) and two elements.
pub(crate) fn small_rubric() -> Arc<RubricStore> {
    let mut principles = BTreeMap::new();
    principles.insert(
        "accuracy".to_string(),
        principle("Accuracy", &[("acc_1", 25.0), ("acc_2", 75.0)]),
    );
    principles.insert(
        "clarity".to_string(),
        principle("Clarity", &[("clr_1", 100.0)]),
    );

    Arc::new(
        RubricStore::new(
            PrinciplesRubric {
                version: None,
                principles,
            },
            checklist(&["baseline", "boundary"], 4.0),
        )
        .expect("small rubric is valid"),
    )
}

/// Six principles p1..p6, each with criteria weighted 40/30/20/10.
pub(crate) fn graded_rubric() -> Arc<RubricStore> {
    let principles = (1..=6)
        .map(|index| {
            (
                format!("p{index}"),
                principle(
                    &format!("Principle {index}"),
                    &[("w40", 40.0), ("w30", 30.0), ("w20", 20.0), ("w10", 10.0)],
                ),
            )
        })
        .collect();

    Arc::new(
        RubricStore::new(
            PrinciplesRubric {
                version: None,
                principles,
            },
            checklist(&["baseline"], 2.0),
        )
        .expect("graded rubric is valid"),
    )
}

pub(crate) fn engine(rubric: Arc<RubricStore>) -> ScoringEngine {
    ScoringEngine::new(rubric)
}

pub(crate) fn judgment(status: &str) -> Value {
    json!({
        "status": status,
        "evidence": "Section 3.2 describes the approach",
        "gap": null
    })
}

pub(crate) fn element_judgment(status: &str) -> Value {
    json!({
        "status": status,
        "evidence": "See plan section",
        "section_ref": "3.1"
    })
}

/// A scorecard for `rubric` with every criterion set to `criterion_status`
/// and every element set to `element_status`.
pub(crate) fn uniform_scorecard(
    rubric: &RubricStore,
    criterion_status: &str,
    element_status: &str,
) -> Value {
    let mut principles = Map::new();
    for (principle_id, principle) in rubric.principles() {
        let criteria: Map<String, Value> = principle
            .criteria
            .keys()
            .map(|criterion_id| (criterion_id.clone(), judgment(criterion_status)))
            .collect();
        principles.insert(principle_id.clone(), json!({ "criteria": criteria }));
    }

    let elements: Map<String, Value> = rubric
        .elements()
        .keys()
        .map(|element_id| (element_id.clone(), element_judgment(element_status)))
        .collect();

    json!({
        "schema_version": "2.0",
        "subject": "Chiller plant retrofit M&V plan",
        "summary": "Option B submetering of the chiller plant.",
        "principle_adherence": { "principles": principles },
        "plan_completeness": { "elements": elements }
    })
}

/// Messages API envelope carrying `text` as its only content block.
pub(crate) fn envelope(text: &str) -> Value {
    json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-20250514",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 5120, "output_tokens": 2048 }
    })
}

pub(crate) fn ok_reply(text: &str) -> ProviderReply {
    ProviderReply {
        status: 200,
        body: envelope(text),
    }
}

pub(crate) fn service_with<G: ModelGateway + 'static>(
    gateway: Arc<G>,
    rubric: Arc<RubricStore>,
) -> ComplianceEvaluationService<G> {
    ComplianceEvaluationService::new(gateway, rubric, IntakeConfig::default())
}

pub(crate) fn as_f64(value: &Value) -> f64 {
    value.as_f64().expect("numeric value")
}
