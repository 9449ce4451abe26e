//! Rubric-driven compliance evaluation of M&V plans.
//!
//! The rubric store feeds both the prompt builder and the scoring engine, so
//! the ids the model is asked to judge are exactly the ids that get scored.
//! The model decides statuses; every number in the reply is recomputed here.

pub mod envelope;
pub mod prompt;
pub mod router;
pub mod rubric;
pub mod scoring;
pub mod service;
pub mod status;

#[cfg(test)]
mod tests;

pub use prompt::{build_system_prompt, SystemPromptCache, SCHEMA_VERSION};
pub use router::{compliance_router, COMPLIANCE_ROUTE};
pub use rubric::{
    ChecklistElement, ChecklistScoring, Criterion, PlanChecklist, Principle, PrinciplesRubric,
    RubricError, RubricStore,
};
pub use scoring::{ScoreSummary, ScoringEngine};
pub use service::{
    ComplianceEvaluationService, EvaluationError, EvaluationReply, ScoringOutcome,
    COMPLIANCE_MAX_TOKENS,
};
pub use status::{CriterionStatus, ElementStatus};
