// Colored terminal output for topics, coverage and run summaries.

use colored::Colorize;

use crate::coverage::aggregate::CoveragePoint;
use crate::corpus::records::Level;
use crate::topics::labels::TopicLabels;

/// Display each topic's label and top terms.
///
/// This is what the analyst reads to decide on topic labels, so terms are
/// shown with their probabilities.
pub fn display_top_terms(top_terms: &[Vec<(String, f64)>], labels: &TopicLabels) {
    println!(
        "\n{}",
        format!("=== Top Terms ({} topics) ===", top_terms.len()).bold()
    );
    println!();

    for (t, terms) in top_terms.iter().enumerate() {
        println!("  {:>2}. {}", t + 1, labels.name(t).bold());
        let line = terms
            .iter()
            .map(|(term, p)| format!("{term} ({p:.3})"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("      {}", line.dimmed());
    }
    println!();
}

/// Display the coverage table: one row per topic, one column per level.
pub fn display_coverage(points: &[CoveragePoint], labels: &TopicLabels) {
    if points.is_empty() {
        println!("No coverage to display: no items were scored.");
        return;
    }

    println!("\n{}", "=== Coverage by Level (log ratio, 0 = uniform) ===".bold());
    println!();
    println!(
        "  {:<24} {:>8} {:>8} {:>8}",
        "Topic".dimmed(),
        "Low".dimmed(),
        "Medium".dimmed(),
        "High".dimmed(),
    );
    println!("  {}", "-".repeat(52).dimmed());

    for (t, name) in labels.names().iter().enumerate() {
        let cells: Vec<String> = Level::ALL
            .iter()
            .map(|level| {
                points
                    .iter()
                    .find(|p| p.topic == t + 1 && p.level == *level)
                    .map(|p| colorize_ratio(p.log_ratio))
                    .unwrap_or_else(|| format!("{:>8}", "-"))
            })
            .collect();
        println!("  {:<24} {}", name, cells.join(" "));
    }
    println!();
}

/// Summarize the run's findings: dropped documents and zero-overlap items.
pub fn display_findings(dropped_standards: &[String], dropped_items: &[String], zero_overlap: &[&str]) {
    if !dropped_standards.is_empty() {
        println!(
            "  {} {} domain(s) had no tokens after filtering: {}",
            "~".yellow(),
            dropped_standards.len(),
            dropped_standards.join(", ")
        );
    }
    if !dropped_items.is_empty() {
        println!(
            "  {} {} item(s) had no tokens after filtering: {}",
            "~".yellow(),
            dropped_items.len(),
            dropped_items.join(", ")
        );
    }
    if !zero_overlap.is_empty() {
        println!(
            "  {} {} item(s) share no vocabulary with the standards (uniform posterior): {}",
            "!".bright_red(),
            zero_overlap.len(),
            zero_overlap.join(", ")
        );
    }
}

/// Color a log ratio: over-represented green, under-represented red.
fn colorize_ratio(value: f64) -> String {
    let text = format!("{value:>8.3}");
    if value >= 0.5 {
        text.bright_green().to_string()
    } else if value <= -0.5 {
        text.red().to_string()
    } else {
        text.normal().to_string()
    }
}
