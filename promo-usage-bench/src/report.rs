//! Console report of a benchmark run.

use std::collections::BTreeMap;

use colored::*;

use crate::recorder::LatencySummary;
use crate::scenario::ScenarioOutcome;

/// Render step results, latency statistics and failure counters as a
/// console report.
pub fn render(
    outcomes: &[ScenarioOutcome],
    summaries: &[LatencySummary],
    counts: &BTreeMap<String, u64>,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("=".repeat(80));
    lines.push("PROMO ORDER USAGE CLIENT BENCHMARK".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    for outcome in outcomes {
        lines.push(format!(
            "{} ({:.1} ms)",
            format!("Transport: {}", outcome.kind).bold(),
            outcome.elapsed.as_secs_f64() * 1000.0
        ));
        for step in &outcome.steps {
            let status = if step.succeeded {
                "OK".green()
            } else {
                "FAILED".red()
            };
            lines.push(format!("  {:<8} {:<8} {}", step.step, status, step.detail));
        }
        lines.push(String::new());
    }

    if !summaries.is_empty() {
        lines.push("Latency (ms):".bold().to_string());
        lines.push(format!(
            "  {:<52} {:>5} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "metric", "n", "p50", "p90", "p99", "mean", "min", "max"
        ));
        for summary in summaries {
            lines.push(format!(
                "  {:<52} {:>5} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
                summary.name,
                summary.samples,
                summary.p50,
                summary.p90,
                summary.p99,
                summary.mean,
                summary.min,
                summary.max
            ));
        }
        lines.push(String::new());
    }

    if !counts.is_empty() {
        lines.push("Counters:".bold().to_string());
        for (name, value) in counts {
            lines.push(format!("  {:<52} {:>5}", name, value));
        }
        lines.push(String::new());
    }

    let failures: usize = outcomes.iter().map(ScenarioOutcome::failures).sum();
    let verdict = if failures == 0 {
        "All steps succeeded".green()
    } else {
        format!("{} step(s) failed", failures).yellow()
    };
    lines.push(verdict.to_string());

    lines.join("\n")
}
