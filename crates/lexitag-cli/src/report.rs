use lexitag_core::classify::CompiledTerms;
use lexitag_core::{Dataset, Dictionary, RunOutcome, RunSummary};

const RULE_WIDTH: usize = 50;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Join lines into a block ending in a newline.
fn block(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Per-dictionary totals, one line each.
pub(crate) fn summary(summary: &RunSummary) -> String {
    let mut lines = vec!["Classification Results:".to_string(), rule()];
    lines.extend(summary.dictionaries.iter().map(|dict| {
        format!(
            "{}: {}/{} statements ({:.1}%)",
            dict.name, dict.detected, summary.total_records, dict.percentage
        )
    }));
    lines.push(String::new());
    lines.push(format!("Total statements: {}", summary.total_records));
    lines.push(format!("Statements with any tactic: {}", summary.any_detected));
    block(lines)
}

/// Per-record breakdown listing the matched terms of each dictionary.
pub(crate) fn details(
    outcome: &RunOutcome,
    dictionaries: &[Dictionary],
    text_column: &str,
    id_column: Option<&str>,
) -> String {
    let source: &Dataset = outcome.annotated.source();
    let compiled: Vec<(&str, CompiledTerms)> = dictionaries
        .iter()
        .map(|d| (d.name(), CompiledTerms::new(d.terms())))
        .collect();

    let mut lines = vec!["Detailed Results:".to_string(), rule()];
    for (idx, record) in source.records().enumerate() {
        let id = id_column
            .and_then(|c| record.get(c))
            .map(str::to_string)
            .unwrap_or_else(|| (idx + 1).to_string());
        let text = record.get(text_column);

        lines.push(String::new());
        lines.push(format!("ID: {id}"));
        lines.push(format!("Statement: {}", text.unwrap_or("")));
        for (name, terms) in &compiled {
            if outcome.annotated.flag(idx, name) == Some(1) {
                let matched = terms.detect(text);
                lines.push(format!("  \u{2713} {name}: {}", matched.matches().join(", ")));
            } else {
                lines.push(format!("  \u{2717} {name}: No matches"));
            }
        }
    }
    block(lines)
}
