// Markdown alignment report.
//
// Summarizes one run for the validity-evidence write-up: corpus sizes,
// topic top terms, coverage by level, findings and the sampled items. The
// charts are linked, not embedded.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::Utc;

use super::shorten_prompt;
use crate::corpus::records::{ItemRecord, Level};
use crate::error::{AlignError, Result};
use crate::pipeline::alignment::AlignmentRun;
use crate::topics::labels::TopicLabels;

const TOP_TERMS: usize = 10;

/// Render the report as a Markdown string.
pub fn render_report(run: &AlignmentRun, items: &[ItemRecord], labels: &TopicLabels) -> String {
    let mut md = String::new();
    let k = run.model.k();

    md.push_str("# Standards / Items Topic Alignment\n\n");
    md.push_str(&format!(
        "Generated {}\n\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    ));

    md.push_str("## Corpus\n\n");
    md.push_str(&format!(
        "- Standards: {} domains, {} terms\n",
        run.standards_dtm.n_documents(),
        run.standards_dtm.n_terms()
    ));
    md.push_str(&format!(
        "- Items: {} scored of {} loaded, {} terms\n",
        run.posterior.len(),
        items.len(),
        run.items_dtm.n_terms()
    ));
    md.push_str(&format!("- Topics (K): {k}\n\n"));

    md.push_str("## Topics\n\n| # | Label | Top terms |\n|---|---|---|\n");
    for (t, terms) in run.model.top_terms(TOP_TERMS).iter().enumerate() {
        let words: Vec<&str> = terms.iter().map(|(w, _)| w.as_str()).collect();
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            t + 1,
            labels.name(t),
            words.join(", ")
        ));
    }

    md.push_str("\n## Coverage by level\n\n");
    md.push_str("Values are `ln(mean probability × K)`; 0 is the uniform baseline 1/K.\n\n");
    md.push_str("| Topic | Low | Medium | High |\n|---|---:|---:|---:|\n");
    for (t, name) in labels.names().iter().enumerate() {
        let cells: Vec<String> = Level::ALL
            .iter()
            .map(|level| {
                run.coverage
                    .iter()
                    .find(|p| p.topic == t + 1 && p.level == *level)
                    .map(|p| format!("{:.3}", p.log_ratio))
                    .unwrap_or_else(|| "-".to_string())
            })
            .collect();
        md.push_str(&format!("| {} | {} |\n", name, cells.join(" | ")));
    }
    md.push_str("\n![Coverage by level](coverage.svg)\n");

    md.push_str("\n## Findings\n\n");
    let zero = run.posterior.zero_overlap_items();
    if zero.is_empty() && run.dropped_items.is_empty() && run.dropped_standards.is_empty() {
        md.push_str("No empty documents and no items without vocabulary overlap.\n");
    }
    if !zero.is_empty() {
        md.push_str(&format!(
            "- {} item(s) share no vocabulary with the standards and received a uniform \
             posterior: {}\n",
            zero.len(),
            zero.join(", ")
        ));
    }
    if !run.dropped_items.is_empty() {
        md.push_str(&format!(
            "- {} item(s) had no tokens after filtering and were not scored: {}\n",
            run.dropped_items.len(),
            run.dropped_items.join(", ")
        ));
    }
    if !run.dropped_standards.is_empty() {
        md.push_str(&format!(
            "- {} domain(s) had no tokens after filtering: {}\n",
            run.dropped_standards.len(),
            run.dropped_standards.join(", ")
        ));
    }

    md.push_str("\n## Sampled items\n\n| Item | Level | Dominant topic | Prompt |\n|---|---|---|---|\n");
    let prompts: HashMap<&str, &ItemRecord> =
        items.iter().map(|i| (i.item_id.as_str(), i)).collect();
    for row in run.sampled_rows() {
        let Some(item) = prompts.get(row.document.as_str()) else {
            continue;
        };
        let topic = row.dominant_topic();
        md.push_str(&format!(
            "| {} | {} | {} ({:.2}) | {} |\n",
            row.document,
            item.level,
            labels.name(topic),
            row.probabilities[topic],
            shorten_prompt(&item.prompt, 80).replace('|', "\\|")
        ));
    }
    md.push_str("\n![Sampled item mixtures](items.svg)\n");

    md
}

pub fn write_report(
    run: &AlignmentRun,
    items: &[ItemRecord],
    labels: &TopicLabels,
    path: &Path,
) -> Result<()> {
    fs::write(path, render_report(run, items, labels))
        .map_err(|e| AlignError::io(path.display().to_string(), e))
}
