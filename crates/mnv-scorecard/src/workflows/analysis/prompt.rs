/// The eight dimensions a quick analysis reports on, in prompt order.
pub const DIMENSIONS: [(&str, &str); 8] = [
    (
        "measurement_method",
        "What measurement approach is used (utility bill analysis, submetering, simulation, etc.)",
    ),
    (
        "boundary_scope",
        "What is the measurement boundary (whole facility, system-level, end-use, component)",
    ),
    (
        "duration_cadence",
        "How long and how frequently measurements occur (snapshot, short-term <30 days, long-term, continuous)",
    ),
    (
        "use_case_fit",
        "What this M&V approach is best suited for (demand response, EE program verification, performance contract, carbon accounting, etc.)",
    ),
    (
        "savings_isolation",
        "Ability to attribute savings to a specific measure vs. confounded by other factors",
    ),
    (
        "interactive_effects",
        "Whether the method captures interactive effects like HVAC-lighting interactions",
    ),
    (
        "baseline_robustness",
        "Quality and approach of baseline construction (normalized, TMY-adjusted, rolling, static snapshot)",
    ),
    (
        "uncertainty_quantification",
        "Whether uncertainty or error is quantified (quantified with CI, acknowledged, not addressed)",
    ),
];

/// Flags the model may assign to a dimension.
pub const FLAGS: [&str; 3] = ["sufficient", "limited", "not_addressed"];

/// Renders the quick-analysis system prompt from [`DIMENSIONS`].
pub fn analysis_prompt() -> String {
    let mut prompt = String::from(
        "You are an expert in Measurement & Verification (M&V) methodology for energy efficiency \
         and demand-side management programs.\n\n",
    );
    prompt.push_str(&format!(
        "When given an M&V plan, methodology description, or vendor capability statement, you \
         will analyze it across {} dimensions:\n\n",
        DIMENSIONS.len()
    ));
    for (index, (key, question)) in DIMENSIONS.iter().enumerate() {
        prompt.push_str(&format!("{}. {key}: {question}\n", index + 1));
    }

    prompt.push_str("\nFor each dimension return:\n");
    prompt.push_str("- label: short 2-4 word label for what was found\n");
    prompt.push_str("- detail: 1-2 sentence explanation of what the plan says or implies\n");
    let [sufficient, limited, not_addressed] = FLAGS;
    prompt.push_str(&format!(
        "- flag: one of \"{sufficient}\", \"{limited}\", or \"{not_addressed}\"\n"
    ));
    prompt.push_str(
        "- inference: one key implication or limitation this creates (what can or can't be done \
         as a result)\n\n",
    );
    prompt.push_str("Also return:\n");
    prompt.push_str("- subject: name/title of the M&V approach being evaluated\n");
    prompt.push_str(
        "- summary: 2-3 sentence plain-language summary of what this M&V is and what it's designed \
         to do\n",
    );
    prompt.push_str("- use_case_match: the single best-fit use case label\n\n");
    prompt.push_str(
        "Return ONLY valid JSON, no markdown, no explanation. Use this exact structure:\n{\n",
    );
    prompt.push_str("  \"subject\": \"...\",\n  \"summary\": \"...\",\n  \"use_case_match\": \"...\",\n");
    prompt.push_str("  \"dimensions\": {\n");

    let rows: Vec<String> = DIMENSIONS
        .iter()
        .map(|(key, _)| {
            format!(
                "    \"{key}\": {{ \"label\": \"...\", \"detail\": \"...\", \"flag\": \"...\", \"inference\": \"...\" }}"
            )
        })
        .collect();
    prompt.push_str(&rows.join(",\n"));
    prompt.push_str("\n  }\n}");

    prompt
}
