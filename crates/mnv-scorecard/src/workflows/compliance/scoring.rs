//! Server-side recomputation of every number in a model-authored scorecard.
//!
//! The model is trusted for categorical judgments and evidence text only.
//! Each `score`, `max_score`, `composite_score`, `structural_index`,
//! `max_possible` and `percentage` it wrote is replaced with a value derived
//! from the statuses and the rubric weights, so re-scoring a scored payload
//! is a no-op.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::rubric::RubricStore;
use super::status::{CriterionStatus, ElementStatus};

/// Stateless scorer bound to the shared rubric.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    rubric: Arc<RubricStore>,
}

/// What one scoring pass touched, for logging and CLI output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub principles_scored: usize,
    pub criteria_scored: usize,
    pub elements_scored: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i64>,
    /// Ids present in the response but unknown to the rubric, e.g.
    /// `accuracy.acc_9` or `elements.appendix`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_ids: Vec<String>,
}

impl ScoringEngine {
    pub fn new(rubric: Arc<RubricStore>) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &RubricStore {
        &self.rubric
    }

    /// Rewrites the numeric fields of `response` in place.
    pub fn score(&self, response: &mut Value) -> ScoreSummary {
        let mut summary = ScoreSummary::default();

        if let Some(adherence) = response
            .get_mut("principle_adherence")
            .and_then(Value::as_object_mut)
        {
            self.score_principles(adherence, &mut summary);
        }

        if let Some(completeness) = response
            .get_mut("plan_completeness")
            .and_then(Value::as_object_mut)
        {
            self.score_elements(completeness, &mut summary);
        }

        summary
    }

    fn score_principles(&self, adherence: &mut Map<String, Value>, summary: &mut ScoreSummary) {
        let mut principle_scores = Vec::new();

        if let Some(principles) = adherence
            .get_mut("principles")
            .and_then(Value::as_object_mut)
        {
            for (principle_id, entry) in principles.iter_mut() {
                let Some(principle) = self.rubric.principle(principle_id) else {
                    summary.ignored_ids.push(principle_id.clone());
                    continue;
                };
                let Some(entry) = entry.as_object_mut() else {
                    continue;
                };

                let mut total = 0.0;
                if let Some(criteria) = entry.get_mut("criteria").and_then(Value::as_object_mut) {
                    for (criterion_id, judgment) in criteria.iter_mut() {
                        let Some(criterion) = principle.criteria.get(criterion_id) else {
                            summary
                                .ignored_ids
                                .push(format!("{principle_id}.{criterion_id}"));
                            continue;
                        };
                        let Some(judgment) = judgment.as_object_mut() else {
                            continue;
                        };

                        let status = CriterionStatus::from_value(judgment.get("status"));
                        let score = criterion.weight * status.multiplier();
                        judgment.insert("score".to_string(), score_value(score));
                        judgment.insert("max_score".to_string(), score_value(criterion.weight));
                        total += score;
                        summary.criteria_scored += 1;
                    }
                }

                entry.insert("score".to_string(), score_value(total));
                principle_scores.push(total);
            }
        }

        summary.principles_scored = principle_scores.len();
        match rounded_mean(&principle_scores) {
            Some(composite) => {
                adherence.insert("composite_score".to_string(), Value::from(composite));
                summary.composite_score = Some(composite);
            }
            None => {
                adherence.remove("composite_score");
            }
        }
    }

    fn score_elements(&self, completeness: &mut Map<String, Value>, summary: &mut ScoreSummary) {
        let mut structural_index: u32 = 0;

        if let Some(elements) = completeness
            .get_mut("elements")
            .and_then(Value::as_object_mut)
        {
            for (element_id, entry) in elements.iter_mut() {
                if self.rubric.element(element_id).is_none() {
                    summary.ignored_ids.push(format!("elements.{element_id}"));
                    continue;
                }
                let Some(entry) = entry.as_object_mut() else {
                    continue;
                };

                let points = ElementStatus::from_value(entry.get("status")).points();
                entry.insert("score".to_string(), Value::from(points));
                structural_index += points;
                summary.elements_scored += 1;
            }
        }

        let max_possible = self.rubric.max_possible();
        let percentage = percentage_of(structural_index, max_possible);

        completeness.insert(
            "structural_index".to_string(),
            Value::from(structural_index),
        );
        completeness.insert("max_possible".to_string(), score_value(max_possible));
        completeness.insert("percentage".to_string(), Value::from(percentage));

        summary.structural_index = Some(structural_index);
        summary.percentage = Some(percentage);
    }
}

/// `round(mean)`, or `None` when nothing was scored.
pub fn rounded_mean(scores: &[f64]) -> Option<i64> {
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some(mean.round() as i64)
}

/// `round(index / max_possible × 100)`; `max_possible` is validated positive.
pub fn percentage_of(structural_index: u32, max_possible: f64) -> i64 {
    (f64::from(structural_index) / max_possible * 100.0).round() as i64
}

/// Whole numbers serialise as JSON integers so `25` stays `25`, not `25.0`.
pub(crate) fn score_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
