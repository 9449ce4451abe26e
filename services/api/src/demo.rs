use crate::infra::load_rubric;
use clap::Args;
use mnv_scorecard::config::AppConfig;
use mnv_scorecard::error::AppError;
use mnv_scorecard::workflows::compliance::envelope::{reply_text, strip_code_fences};
use mnv_scorecard::workflows::compliance::{
    build_system_prompt, RubricStore, ScoreSummary, ScoringEngine,
};
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Saved model reply: a Messages API envelope, or the model's JSON text (fences allowed)
    pub(crate) file: PathBuf,
    /// Print the corrected JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_prompt() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rubric = load_rubric(&config.rubric)?;
    println!("{}", build_system_prompt(&rubric)?);
    Ok(())
}

pub(crate) fn run_rubric_check() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rubric = load_rubric(&config.rubric)?;

    println!("Rubric OK");
    println!(
        "- {} principles / {} criteria",
        rubric.principle_count(),
        rubric.criterion_count()
    );
    for (principle_id, principle) in rubric.principles() {
        println!(
            "  - {} ({}): {} criteria, weights total {}",
            principle.name,
            principle_id,
            principle.criteria.len(),
            principle.total_weight()
        );
    }
    println!(
        "- {} checklist elements, max_possible {}",
        rubric.element_count(),
        rubric.max_possible()
    );

    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs { file, json } = args;

    let config = AppConfig::load()?;
    let rubric = load_rubric(&config.rubric)?;
    let raw = fs::read_to_string(&file)?;

    let mut scorecard = scorecard_from_saved_reply(&raw)?;
    let Some(summary) = score_saved_reply(rubric.clone(), &mut scorecard) else {
        println!("{} does not contain a JSON object; nothing to score", file.display());
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&scorecard)?);
    } else {
        print!("{}", render_summary(&rubric, &scorecard, &summary));
    }
    Ok(())
}

/// Accepts either a full provider envelope or the bare model text.
pub(crate) fn scorecard_from_saved_reply(raw: &str) -> Result<Value, serde_json::Error> {
    let stripped = strip_code_fences(raw);
    let parsed: Value = serde_json::from_str(&stripped)?;

    if parsed.get("content").map_or(false, Value::is_array) {
        let text = reply_text(&parsed);
        return serde_json::from_str(&strip_code_fences(&text));
    }
    Ok(parsed)
}

pub(crate) fn score_saved_reply(
    rubric: Arc<RubricStore>,
    scorecard: &mut Value,
) -> Option<ScoreSummary> {
    if !scorecard.is_object() {
        return None;
    }
    Some(ScoringEngine::new(rubric).score(scorecard))
}

pub(crate) fn render_summary(
    rubric: &RubricStore,
    scorecard: &Value,
    summary: &ScoreSummary,
) -> String {
    let mut out = String::new();

    if let Some(subject) = scorecard.get("subject").and_then(Value::as_str) {
        let _ = writeln!(out, "Scorecard: {subject}");
    } else {
        let _ = writeln!(out, "Scorecard");
    }

    let _ = writeln!(out, "\nPrinciple adherence");
    let principles = &scorecard["principle_adherence"]["principles"];
    for (principle_id, principle) in rubric.principles() {
        match principles.get(principle_id).and_then(|entry| entry.get("score")) {
            Some(score) => {
                let _ = writeln!(
                    out,
                    "- {}: {} / {}",
                    principle.name,
                    score,
                    principle.total_weight()
                );
            }
            None => {
                let _ = writeln!(out, "- {}: not judged", principle.name);
            }
        }
    }
    match summary.composite_score {
        Some(composite) => {
            let _ = writeln!(out, "Composite score: {composite}");
        }
        None => {
            let _ = writeln!(out, "Composite score: n/a");
        }
    }

    let _ = writeln!(out, "\nPlan completeness");
    let elements = &scorecard["plan_completeness"]["elements"];
    for (element_id, element) in rubric.elements() {
        let status = elements
            .get(element_id)
            .and_then(|entry| entry.get("status"))
            .and_then(Value::as_str)
            .unwrap_or("not judged");
        let _ = writeln!(out, "- {}: {}", element.name, status);
    }
    if let (Some(index), Some(percentage)) = (summary.structural_index, summary.percentage) {
        let _ = writeln!(
            out,
            "Structural index: {index} / {} ({percentage}%)",
            rubric.max_possible()
        );
    }

    if !summary.ignored_ids.is_empty() {
        let _ = writeln!(
            out,
            "\nIgnored ids not in the rubric: {}",
            summary.ignored_ids.join(", ")
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rubric() -> Arc<RubricStore> {
        Arc::new(RubricStore::embedded().expect("embedded rubric is valid"))
    }

    fn model_text() -> Value {
        json!({
            "subject": "Chiller plant retrofit",
            "principle_adherence": {
                "composite_score": 3,
                "principles": {
                    "accuracy": { "criteria": { "acc_1": { "status": "met" }, "acc_2": { "status": "partial" } } },
                    "legacy": { "criteria": {} }
                }
            },
            "plan_completeness": {
                "elements": {
                    "baseline_definition": { "status": "present" },
                    "reporting_period": { "status": "partial" }
                }
            }
        })
    }

    #[test]
    fn saved_envelope_and_bare_text_are_both_accepted() {
        let text = model_text().to_string();
        let envelope = json!({
            "content": [{ "type": "text", "text": format!("```json\n{text}\n```") }]
        });

        let from_envelope = scorecard_from_saved_reply(&envelope.to_string()).expect("envelope");
        let from_text = scorecard_from_saved_reply(&format!("```json\n{text}\n```")).expect("text");

        assert_eq!(from_envelope, model_text());
        assert_eq!(from_text, model_text());
    }

    #[test]
    fn non_json_reply_is_an_error() {
        assert!(scorecard_from_saved_reply("The plan looks fine.").is_err());
    }

    #[test]
    fn non_object_reply_is_not_scored() {
        let mut scorecard = json!(["met"]);
        assert!(score_saved_reply(rubric(), &mut scorecard).is_none());
    }

    #[test]
    fn summary_reports_recomputed_scores() {
        let rubric = rubric();
        let mut scorecard = model_text();
        let summary = score_saved_reply(rubric.clone(), &mut scorecard).expect("scored");

        // acc_1 met (25) + acc_2 partial (10)
        assert_eq!(scorecard["principle_adherence"]["composite_score"], json!(35));

        let rendered = render_summary(&rubric, &scorecard, &summary);
        assert!(rendered.starts_with("Scorecard: Chiller plant retrofit\n"));
        assert!(rendered.contains("Composite score: 35"));
        assert!(rendered.contains("Structural index: 3 / 22 (14%)"));
        assert!(rendered.contains("Ignored ids not in the rubric: legacy"));
        assert!(rendered.contains(": not judged"));
    }
}
