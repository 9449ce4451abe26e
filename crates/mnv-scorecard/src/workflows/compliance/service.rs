use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::envelope::{parse_model_json, reply_text, replace_reply_text};
use super::prompt::SystemPromptCache;
use super::rubric::{RubricError, RubricStore};
use super::scoring::{ScoreSummary, ScoringEngine};
use crate::config::IntakeConfig;
use crate::workflows::intake::{validated_content, ContentSubmission, IntakeError};
use crate::workflows::provider::{ModelGateway, ModelRequest, ProviderError, ProviderReply};

pub const COMPLIANCE_MAX_TOKENS: u32 = 4000;

/// Orchestrates one compliance evaluation: validate, prompt, call the model,
/// rescore.
pub struct ComplianceEvaluationService<G> {
    gateway: Arc<G>,
    prompt: SystemPromptCache,
    engine: ScoringEngine,
    intake: IntakeConfig,
}

/// What happened to the model's text on its way back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringOutcome {
    /// Parsed and recomputed; the reply text now carries the corrected JSON.
    Scored(ScoreSummary),
    /// The text was not a JSON object; the reply is returned untouched.
    Unparsed,
    /// Non-2xx reply passed through without inspection.
    PassedThrough,
}

/// Status and body to send back, plus how scoring went.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReply {
    pub status: u16,
    pub body: Value,
    pub scoring: ScoringOutcome,
}

impl<G> ComplianceEvaluationService<G>
where
    G: ModelGateway + 'static,
{
    pub fn new(gateway: Arc<G>, rubric: Arc<RubricStore>, intake: IntakeConfig) -> Self {
        Self {
            gateway,
            prompt: SystemPromptCache::new(rubric.clone()),
            engine: ScoringEngine::new(rubric),
            intake,
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// The cached compliance prompt, built on first use.
    pub fn system_prompt(&self) -> Result<&str, RubricError> {
        self.prompt.get()
    }

    pub async fn evaluate(
        &self,
        submission: &ContentSubmission,
    ) -> Result<EvaluationReply, EvaluationError> {
        if !self.gateway.is_configured() {
            return Err(ProviderError::MissingCredential.into());
        }

        let content = validated_content(submission, self.intake)?;
        let system = self.prompt.get()?.to_string();

        let reply = self
            .gateway
            .complete(ModelRequest {
                system,
                user_content: content,
                max_tokens: COMPLIANCE_MAX_TOKENS,
            })
            .await?;

        Ok(self.rescore_reply(reply))
    }

    /// Recomputes the scores carried in a provider reply. Never fails: a
    /// reply that cannot be parsed is handed back as it arrived.
    pub fn rescore_reply(&self, reply: ProviderReply) -> EvaluationReply {
        if !reply.is_success() {
            let ProviderReply { status, body } = reply;
            info!(status, "provider returned an error status; passing through");
            return EvaluationReply {
                status,
                body,
                scoring: ScoringOutcome::PassedThrough,
            };
        }

        let ProviderReply { status, mut body } = reply;

        let Some(mut scorecard) = parse_model_json(&reply_text(&body)) else {
            warn!("model reply was not a JSON object; returning it unscored");
            return EvaluationReply {
                status,
                body,
                scoring: ScoringOutcome::Unparsed,
            };
        };

        let summary = self.engine.score(&mut scorecard);
        match serde_json::to_string(&scorecard) {
            Ok(text) => replace_reply_text(&mut body, text),
            Err(err) => {
                warn!(error = %err, "unable to serialise scored reply; returning it unscored");
                return EvaluationReply {
                    status,
                    body,
                    scoring: ScoringOutcome::Unparsed,
                };
            }
        }

        if !summary.ignored_ids.is_empty() {
            debug!(ignored = ?summary.ignored_ids, "ids unknown to the rubric were not scored");
        }
        info!(
            principles = summary.principles_scored,
            criteria = summary.criteria_scored,
            elements = summary.elements_scored,
            composite_score = ?summary.composite_score,
            structural_index = ?summary.structural_index,
            "compliance evaluation scored"
        );

        EvaluationReply {
            status,
            body,
            scoring: ScoringOutcome::Scored(summary),
        }
    }
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Rubric(#[from] RubricError),
}
