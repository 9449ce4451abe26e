use std::sync::{Arc, OnceLock};

use serde_json::{json, Map, Value};
use tracing::debug;

use super::rubric::{RubricError, RubricStore, PRINCIPLE_SCALE};
use super::scoring::score_value;
use super::status::{CriterionStatus, ElementStatus};

pub const SCHEMA_VERSION: &str = "2.0";

/// Renders the system prompt for a compliance evaluation.
///
/// Both the rubric tables and the JSON response template are generated from
/// the same [`RubricStore`], so every id the model is asked to fill in is an
/// id the scoring engine knows.
pub fn build_system_prompt(rubric: &RubricStore) -> Result<String, RubricError> {
    let mut prompt = preamble(rubric);
    prompt.push_str(&principles_section(rubric));
    prompt.push_str(&checklist_section(rubric));
    prompt.push_str("## RESPONSE FORMAT\n\n");
    prompt.push_str("Return ONLY valid JSON, no markdown, no explanation. Use this exact structure:\n\n");
    prompt.push_str(&response_template(rubric)?);
    prompt.push_str(&format!(
        "\n\nCRITICAL: All numeric scores must be actual numbers, not strings. \
         The composite_score must be the arithmetic mean of the {} principle scores, \
         rounded to the nearest integer.",
        rubric.principle_count()
    ));

    Ok(prompt)
}

fn preamble(rubric: &RubricStore) -> String {
    format!(
        "You are an expert evaluator of Measurement & Verification (M&V) plans for energy \
efficiency and demand-side management programs.

You will evaluate an M&V plan across two axes:
1. **M&V Quality Principles** — adherence to {principles} universal quality principles ({criteria} criteria total)
2. **Plan Structural Completeness** — presence of {elements} essential plan elements

Your evaluation must be protocol-neutral. These are best practices for any rigorous M&V plan, \
not specific to any single standard or protocol.

IMPORTANT INSTRUCTIONS:
- Evaluate ONLY what is present in the submitted text. Do not assume content that is not stated.
- Cite specific evidence from the plan text for each criterion and element.
- When text is ambiguous, score conservatively (partial rather than met).
- If the text is not an M&V plan, still evaluate it against these criteria — many M&V-adjacent \
documents contain relevant content.

",
        principles = rubric.principle_count(),
        criteria = rubric.criterion_count(),
        elements = rubric.element_count(),
    )
}

fn principles_section(rubric: &RubricStore) -> String {
    let statuses = quoted(CriterionStatus::ALL.iter().map(|status| status.as_str()));
    let mut section = String::from("## AXIS 1: M&V Quality Principles\n\n");
    section.push_str(&format!(
        "Evaluate the M&V plan against these {} principles. Each principle has weighted criteria.\n",
        rubric.principle_count()
    ));
    section.push_str(&format!(
        "For each criterion, assign a status: {statuses}.\n"
    ));
    section.push_str(&format!(
        "Score = status weight × criterion weight ({}).\n",
        CriterionStatus::ALL
            .iter()
            .map(|status| format!("{}={:.1}", status.as_str(), status.multiplier()))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    section.push_str(
        "For partial status, the score is EXACTLY weight × 0.5. For example, a criterion with \
         weight 25 and status \"partial\" scores exactly 12.5.\n",
    );
    section.push_str(&format!(
        "The principle score = sum of (status_weight × criterion_weight) for all criteria in \
         that principle; a fully met principle scores {PRINCIPLE_SCALE}.\n"
    ));
    section.push_str(
        "Do not independently estimate principle or composite scores — they will be recomputed \
         server-side.\n\n",
    );

    for principle in rubric.principles().values() {
        section.push_str(&format!("### {}\n", principle.name));
        section.push_str(&format!("{}\n\n", principle.description));
        section.push_str("| ID | Criterion | Weight | Met | Partial | Not Met |\n");
        section.push_str("|---|---|---|---|---|---|\n");

        for (criterion_id, criterion) in &principle.criteria {
            section.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                cell(criterion_id),
                cell(&criterion.name),
                criterion.weight,
                cell(&criterion.met),
                cell(&criterion.partial),
                cell(&criterion.not_met)
            ));
        }
        section.push('\n');
    }

    section
}

fn checklist_section(rubric: &RubricStore) -> String {
    let mut section = String::from("## AXIS 2: Plan Structural Completeness\n\n");
    section.push_str(&format!(
        "Evaluate whether the M&V plan contains these {} structural elements.\n",
        rubric.element_count()
    ));
    section.push_str(&format!(
        "For each element, assign: {}.\n",
        ElementStatus::ALL
            .iter()
            .map(|status| {
                let points = status.points();
                let unit = if points == 1 { "point" } else { "points" };
                format!("\"{}\" ({points} {unit})", status.as_str())
            })
            .collect::<Vec<_>>()
            .join(", ")
    ));
    section.push_str(&format!(
        "structural_index = sum of all element scores. max_possible = {}.\n",
        rubric.max_possible()
    ));
    section.push_str("percentage = round(structural_index / max_possible × 100).\n\n");
    section.push_str("| ID | Element | What to look for | Present | Partial | Missing |\n");
    section.push_str("|---|---|---|---|---|---|\n");

    for (element_id, element) in rubric.elements() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            cell(element_id),
            cell(&element.name),
            cell(&element.look_for),
            cell(&element.present),
            cell(&element.partial),
            cell(&element.missing)
        ));
    }
    section.push('\n');

    section
}

/// JSON skeleton whose keys are walked from the rubric itself.
pub fn response_template(rubric: &RubricStore) -> Result<String, RubricError> {
    let criterion_statuses = CriterionStatus::ALL
        .iter()
        .map(|status| status.as_str())
        .collect::<Vec<_>>()
        .join("|");
    let element_statuses = ElementStatus::ALL
        .iter()
        .map(|status| status.as_str())
        .collect::<Vec<_>>()
        .join("|");

    let mut principles = Map::new();
    for (principle_id, principle) in rubric.principles() {
        let mut criteria = Map::new();
        for criterion_id in principle.criteria.keys() {
            criteria.insert(
                criterion_id.clone(),
                json!({
                    "score": "<number: status_weight × criterion_weight>",
                    "max_score": "<number: criterion weight>",
                    "status": format!("<{criterion_statuses}>"),
                    "evidence": "<string: quote or cite specific text from the plan>",
                    "gap": "<string|null: what is missing, null if met>",
                }),
            );
        }
        principles.insert(
            principle_id.clone(),
            json!({
                "score": "<number: sum of criteria scores, 0-100>",
                "criteria": Value::Object(criteria),
            }),
        );
    }

    let mut elements = Map::new();
    for element_id in rubric.elements().keys() {
        elements.insert(
            element_id.clone(),
            json!({
                "score": "<number: 0, 1, or 2>",
                "status": format!("<{element_statuses}>"),
                "evidence": "<string: quote or cite specific text from the plan>",
                "section_ref": "<string|null: section reference if identifiable>",
            }),
        );
    }

    let template = json!({
        "schema_version": SCHEMA_VERSION,
        "subject": "<string: name/title of the M&V plan being evaluated>",
        "summary": "<string: 2-3 sentence plain-language summary of the evaluation>",
        "principle_adherence": {
            "composite_score": format!(
                "<number: average of {} principle scores, 0-100>",
                rubric.principle_count()
            ),
            "principles": Value::Object(principles),
        },
        "plan_completeness": {
            "structural_index": "<number: sum of element scores>",
            "max_possible": score_value(rubric.max_possible()),
            "percentage": "<number: structural_index / max_possible × 100>",
            "elements": Value::Object(elements),
        },
    });

    serde_json::to_string_pretty(&template)
        .map_err(|err| RubricError::Malformed(format!("unable to render response template: {err}")))
}

fn quoted<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    let labels: Vec<String> = labels.map(|label| format!("\"{label}\"")).collect();
    match labels.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {last}", rest.join(", ")),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

/// Keeps free text from breaking out of a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Process-wide memo of the compliance system prompt.
///
/// Two requests racing on the first build both render the prompt; the loser's
/// copy is dropped. The builder is pure, so either copy is the same string.
#[derive(Debug)]
pub struct SystemPromptCache {
    rubric: Arc<RubricStore>,
    prompt: OnceLock<String>,
}

impl SystemPromptCache {
    pub fn new(rubric: Arc<RubricStore>) -> Self {
        Self {
            rubric,
            prompt: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Result<&str, RubricError> {
        if let Some(prompt) = self.prompt.get() {
            return Ok(prompt);
        }

        let built = build_system_prompt(&self.rubric)?;
        debug!(chars = built.len(), "compliance system prompt built");
        Ok(self.prompt.get_or_init(|| built))
    }

    pub fn is_built(&self) -> bool {
        self.prompt.get().is_some()
    }
}
