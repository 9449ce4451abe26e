use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RubricSources;

const EMBEDDED_PRINCIPLES: &str = include_str!("../../../rubrics/mv-principles-v1.json");
const EMBEDDED_CHECKLIST: &str = include_str!("../../../rubrics/plan-checklist-v1.json");

/// Points each element is worth when present; `max_possible` must equal this
/// times the element count.
pub const PRESENT_POINTS: f64 = 2.0;

/// Principle weights are authored so that a fully met principle scores 100.
pub const PRINCIPLE_SCALE: f64 = 100.0;

/// One weighted criterion; `weight` is the most points it can award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    pub weight: f64,
    pub met: String,
    pub partial: String,
    pub not_met: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principle {
    pub name: String,
    pub description: String,
    pub criteria: BTreeMap<String, Criterion>,
}

impl Principle {
    pub fn total_weight(&self) -> f64 {
        self.criteria.values().map(|criterion| criterion.weight).sum()
    }
}

/// The quality-principles axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinciplesRubric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub principles: BTreeMap<String, Principle>,
}

/// A structural element the plan is expected to contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistElement {
    pub name: String,
    pub look_for: String,
    pub present: String,
    pub partial: String,
    pub missing: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChecklistScoring {
    pub max_possible: f64,
}

/// The structural-completeness axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanChecklist {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub elements: BTreeMap<String, ChecklistElement>,
    pub scoring: ChecklistScoring,
}

/// Validated, read-only rubric data shared by the prompt builder and the
/// scoring engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RubricStore {
    principles: PrinciplesRubric,
    checklist: PlanChecklist,
}

impl RubricStore {
    pub fn new(principles: PrinciplesRubric, checklist: PlanChecklist) -> Result<Self, RubricError> {
        validate_principles(&principles)?;
        validate_checklist(&checklist)?;

        for (principle_id, principle) in &principles.principles {
            let total = principle.total_weight();
            if (total - PRINCIPLE_SCALE).abs() > 1e-9 {
                warn!(
                    principle = %principle_id,
                    total_weight = total,
                    "criterion weights do not sum to 100; principle scores will not share a common scale"
                );
            }
        }

        let store = Self {
            principles,
            checklist,
        };
        debug!(
            principles = store.principle_count(),
            criteria = store.criterion_count(),
            elements = store.element_count(),
            "rubric loaded"
        );
        Ok(store)
    }

    /// The rubric and checklist compiled into the binary.
    pub fn embedded() -> Result<Self, RubricError> {
        Self::from_json(EMBEDDED_PRINCIPLES, EMBEDDED_CHECKLIST)
    }

    pub fn from_json(principles: &str, checklist: &str) -> Result<Self, RubricError> {
        let principles: PrinciplesRubric =
            serde_json::from_str(principles).map_err(|source| RubricError::Parse {
                document: "principles rubric",
                source,
            })?;
        let checklist: PlanChecklist =
            serde_json::from_str(checklist).map_err(|source| RubricError::Parse {
                document: "plan checklist",
                source,
            })?;
        Self::new(principles, checklist)
    }

    /// Loads the configured overrides, falling back to the embedded documents.
    pub fn from_sources(sources: &RubricSources) -> Result<Self, RubricError> {
        let principles = match &sources.principles_path {
            Some(path) => read_document(path)?,
            None => EMBEDDED_PRINCIPLES.to_string(),
        };
        let checklist = match &sources.checklist_path {
            Some(path) => read_document(path)?,
            None => EMBEDDED_CHECKLIST.to_string(),
        };
        Self::from_json(&principles, &checklist)
    }

    pub fn principles(&self) -> &BTreeMap<String, Principle> {
        &self.principles.principles
    }

    pub fn principle(&self, principle_id: &str) -> Option<&Principle> {
        self.principles.principles.get(principle_id)
    }

    pub fn elements(&self) -> &BTreeMap<String, ChecklistElement> {
        &self.checklist.elements
    }

    pub fn element(&self, element_id: &str) -> Option<&ChecklistElement> {
        self.checklist.elements.get(element_id)
    }

    pub fn max_possible(&self) -> f64 {
        self.checklist.scoring.max_possible
    }

    pub fn principle_count(&self) -> usize {
        self.principles.principles.len()
    }

    pub fn criterion_count(&self) -> usize {
        self.principles
            .principles
            .values()
            .map(|principle| principle.criteria.len())
            .sum()
    }

    pub fn element_count(&self) -> usize {
        self.checklist.elements.len()
    }
}

fn read_document(path: &Path) -> Result<String, RubricError> {
    fs::read_to_string(path).map_err(|source| RubricError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_principles(rubric: &PrinciplesRubric) -> Result<(), RubricError> {
    if rubric.principles.is_empty() {
        return Err(RubricError::malformed("rubric defines no principles"));
    }

    for (principle_id, principle) in &rubric.principles {
        require_text(&principle.name, || format!("principle '{principle_id}' has no name"))?;
        if principle.criteria.is_empty() {
            return Err(RubricError::malformed(format!(
                "principle '{principle_id}' has no criteria"
            )));
        }

        for (criterion_id, criterion) in &principle.criteria {
            let label = format!("criterion '{principle_id}.{criterion_id}'");
            if !criterion.weight.is_finite() || criterion.weight <= 0.0 {
                return Err(RubricError::malformed(format!(
                    "{label} has non-positive weight {}",
                    criterion.weight
                )));
            }
            require_text(&criterion.name, || format!("{label} has no name"))?;
            require_text(&criterion.met, || format!("{label} has no 'met' description"))?;
            require_text(&criterion.partial, || {
                format!("{label} has no 'partial' description")
            })?;
            require_text(&criterion.not_met, || {
                format!("{label} has no 'not_met' description")
            })?;
        }
    }

    Ok(())
}

fn validate_checklist(checklist: &PlanChecklist) -> Result<(), RubricError> {
    if checklist.elements.is_empty() {
        return Err(RubricError::malformed("checklist defines no elements"));
    }

    for (element_id, element) in &checklist.elements {
        let label = format!("element '{element_id}'");
        require_text(&element.name, || format!("{label} has no name"))?;
        require_text(&element.look_for, || format!("{label} has no 'look_for' text"))?;
        require_text(&element.present, || {
            format!("{label} has no 'present' description")
        })?;
        require_text(&element.partial, || {
            format!("{label} has no 'partial' description")
        })?;
        require_text(&element.missing, || {
            format!("{label} has no 'missing' description")
        })?;
    }

    let max_possible = checklist.scoring.max_possible;
    if !max_possible.is_finite() || max_possible <= 0.0 {
        return Err(RubricError::malformed(format!(
            "max_possible must be positive, got {max_possible}"
        )));
    }

    let expected = PRESENT_POINTS * checklist.elements.len() as f64;
    if (max_possible - expected).abs() > 1e-9 {
        return Err(RubricError::malformed(format!(
            "max_possible is {max_possible} but {} elements at {PRESENT_POINTS} points allow {expected}",
            checklist.elements.len()
        )));
    }

    Ok(())
}

fn require_text(value: &str, describe: impl FnOnce() -> String) -> Result<(), RubricError> {
    if value.trim().is_empty() {
        Err(RubricError::Malformed(describe()))
    } else {
        Ok(())
    }
}

/// Failure to load or validate rubric data.
#[derive(Debug, thiserror::Error)]
pub enum RubricError {
    #[error("unable to read rubric file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to parse {document}: {source}")]
    Parse {
        document: &'static str,
        source: serde_json::Error,
    },
    #[error("malformed rubric: {0}")]
    Malformed(String),
}

impl RubricError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}
