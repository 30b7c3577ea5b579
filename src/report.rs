//! Plain-text data quality report.
//!
//! Rendering only formats finalized [`QualityStats`]; nothing is
//! recomputed here. All percentages use one decimal place. The generation
//! timestamp is a parameter, so the same inputs always render the same
//! text.
//!
//! # Layout
//!
//! ```text
//! ============================================================
//! Data Quality Report
//! ============================================================
//! Generated at (UTC): 2025-05-06T12:00:00+00:00
//!
//! Summary
//! ------------------------------------------------------------
//! Total records processed: 10
//! Valid records: 6
//! Invalid records: 4
//! Valid rate: 60.0%
//! Failure reasons recorded: 6
//!
//! Completeness by field (%)
//! ------------------------------------------------------------
//! title     :  80.0%
//! ...
//!
//! Common validation failures
//! ------------------------------------------------------------
//! missing or empty field: title: 2
//! ...
//! ============================================================
//! ```

use crate::pipeline::QualityStats;
use chrono::{DateTime, Utc};

const RULE_WIDTH: usize = 60;

/// Render the report for `stats`, listing at most `top_n` failure reasons.
///
/// # Arguments
///
/// * `stats` - Finalized statistics for the run
/// * `top_n` - Maximum number of failure reasons to list
/// * `generated_at` - Timestamp for the header line
///
/// # Returns
///
/// The report text without a trailing newline. Identical inputs always
/// render identical text.
pub fn render(stats: &QualityStats, top_n: usize, generated_at: DateTime<Utc>) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut lines: Vec<String> = Vec::new();

    lines.push(heavy.clone());
    lines.push("Data Quality Report".to_string());
    lines.push(heavy.clone());
    lines.push(format!("Generated at (UTC): {}", generated_at.to_rfc3339()));
    lines.push(String::new());

    lines.push("Summary".to_string());
    lines.push(light.clone());
    lines.push(format!("Total records processed: {}", stats.total));
    lines.push(format!("Valid records: {}", stats.valid));
    lines.push(format!("Invalid records: {}", stats.invalid));
    lines.push(format!("Valid rate: {:.1}%", stats.valid_rate()));
    lines.push(format!("Failure reasons recorded: {}", stats.total_reasons()));
    lines.push(String::new());

    lines.push("Completeness by field (%)".to_string());
    lines.push(light.clone());
    for (field, pct) in &stats.completeness {
        lines.push(format!("{field:<10}: {pct:>5.1}%"));
    }
    lines.push(String::new());

    lines.push("Common validation failures".to_string());
    lines.push(light);
    if stats.failure_counts.is_empty() {
        lines.push("None".to_string());
    } else {
        for (reason, count) in stats.failure_counts.iter().take(top_n) {
            lines.push(format!("{reason}: {count}"));
        }
        let distinct = stats.failure_counts.len();
        if distinct > top_n {
            lines.push(format!("(showing {top_n} of {distinct} distinct reasons)"));
        }
    }
    lines.push(heavy);

    lines.join("\n")
}
