//! Console text rendering of engine reports.
//!
//! Lists are capped at `limit` entries with an "... and N more" tail; the
//! report structures themselves always hold everything.

use std::fmt::Write;

use smx_engine::aggregator::{UNKNOWN_ERROR, UNKNOWN_LABEL};
use smx_engine::{Diagnostic, FrequencyEntry, SummaryReport, ValidationReport};

const RULE: &str = "================================================================================";

/// Renders a validation report.
pub fn validation_text(report: &ValidationReport, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "State Validation Report");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "  Total Entries: {}", report.total_entries);
    let _ = writeln!(out, "  Valid Entries: {}", report.valid_entries);
    let _ = writeln!(out, "  Invalid Entries: {}", report.invalid_entries);
    if report.total_entries > 0 {
        let _ = writeln!(out, "  Success Rate: {:.2}%", report.success_rate());
    }
    let _ = writeln!(out);

    diagnostics_section(&mut out, "Errors", "errors", &report.errors, limit);
    diagnostics_section(&mut out, "Warnings", "warnings", &report.warnings, limit);

    let _ = writeln!(out, "{RULE}");
    out
}

fn diagnostics_section(
    out: &mut String,
    title: &str,
    noun: &str,
    diagnostics: &[Diagnostic],
    limit: usize,
) {
    if diagnostics.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title} ({}):", diagnostics.len());
    for (i, diagnostic) in diagnostics.iter().take(limit).enumerate() {
        let _ = writeln!(
            out,
            "  {}. Line {}: {}",
            i + 1,
            diagnostic.line_number,
            diagnostic.reason
        );
    }
    if diagnostics.len() > limit {
        let _ = writeln!(out, "  ... and {} more {noun}", diagnostics.len() - limit);
    }
    let _ = writeln!(out);
}

/// Renders an aggregate summary.
pub fn summary_text(summary: &SummaryReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Summary ===");
    let _ = writeln!(out, "Total operations: {}", summary.total_operations);
    let _ = writeln!(out, "Success rate: {:.1}%", summary.success_rate);
    let _ = writeln!(out, "Successful: {}", summary.successful);
    let _ = writeln!(out, "Warnings: {}", summary.warnings);
    let _ = writeln!(out, "Errors: {}", summary.errors);
    let _ = writeln!(out, "Critical: {}", summary.critical);
    if summary.unknown > 0 {
        let _ = writeln!(out, "Unknown status: {}", summary.unknown);
    }
    if summary.malformed_lines > 0 {
        let _ = writeln!(out, "Malformed lines: {}", summary.malformed_lines);
    }

    frequency_section(&mut out, "Top primitives", &summary.top_primitives, summary.total_operations);
    frequency_section(&mut out, "Top contexts", &summary.top_contexts, summary.total_operations);

    let perf = &summary.performance;
    let _ = writeln!(out);
    let _ = writeln!(out, "=== Performance ===");
    let _ = writeln!(
        out,
        "{:<14}{:>10}{:>10}{:>10}{:>10}{:>10}",
        "Metric", "Min", "Avg", "Max", "P95", "P99"
    );
    let d = &perf.duration_ms;
    let _ = writeln!(
        out,
        "{:<14}{:>10.2}{:>10.2}{:>10.2}{:>10.2}{:>10.2}",
        "Duration (ms)", d.min, d.avg, d.max, d.p95, d.p99
    );
    for (label, s) in [("CPU (%)", &perf.cpu_percent), ("Memory (MB)", &perf.memory_mb)] {
        let _ = writeln!(
            out,
            "{:<14}{:>10.2}{:>10.2}{:>10.2}{:>10}{:>10}",
            label, s.min, s.avg, s.max, "-", "-"
        );
    }

    let errors = &summary.error_analysis;
    let _ = writeln!(out);
    let _ = writeln!(out, "=== Errors ===");
    let _ = writeln!(out, "Total errors: {}", errors.total_errors);
    for entry in &errors.error_types {
        let _ = writeln!(out, "  {:>6}  {}", entry.count, entry.value);
    }
    if !errors.error_primitives.is_empty() {
        let _ = writeln!(out, "By primitive:");
        for entry in &errors.error_primitives {
            let _ = writeln!(out, "  {:>6}  {}", entry.count, entry.value);
        }
    }
    if !errors.recent_errors.is_empty() {
        let _ = writeln!(out, "Recent:");
        for record in &errors.recent_errors {
            let _ = writeln!(
                out,
                "  [{}] {}/{}: {}",
                record.status.as_str(),
                record.primitive.as_deref().unwrap_or(UNKNOWN_LABEL),
                record.context.as_deref().unwrap_or(UNKNOWN_LABEL),
                record.message.as_deref().unwrap_or(UNKNOWN_ERROR)
            );
        }
    }
    out
}

fn frequency_section(out: &mut String, title: &str, entries: &[FrequencyEntry], total: usize) {
    if entries.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "=== {title} ===");
    for entry in entries {
        let share = if total == 0 {
            0.0
        } else {
            entry.count as f64 / total as f64 * 100.0
        };
        let _ = writeln!(out, "  {:<24}{:>8}{:>8.1}%", entry.value, entry.count, share);
    }
}
