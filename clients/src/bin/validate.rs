//! `smx-validate` — Validates an audit log against the state matrix.
//!
//! Every record's primitive, context, and derived state must exist in the
//! matrix. State-id mismatches and questionable transitions are reported as
//! warnings.
//!
//! **Usage:**
//! ```
//! smx-validate --matrix <csv> --audit-log <jsonl> [--output <path>] [--format text|json]
//! ```
//!
//! Exits non-zero if any entry is invalid.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use smx_clients::{init_logging, render, writer, Format};
use smx_engine::{validate_log, EngineConfig, RecordValidator, StateVocabulary};

/// Validate audit-log state transitions against the state matrix.
#[derive(Parser)]
#[command(
    name = "smx-validate",
    about = "Validate audit-log records against the state matrix"
)]
struct Args {
    /// Path to the state matrix CSV file.
    #[arg(long)]
    matrix: PathBuf,

    /// Path to the audit log (JSON lines).
    #[arg(long)]
    audit_log: PathBuf,

    /// Output report file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Engine configuration file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let vocabulary = StateVocabulary::load(&args.matrix);
    for problem in &vocabulary.diagnostics {
        eprintln!("Error loading state matrix: {problem}");
    }

    let validator = RecordValidator::with_config(&vocabulary.value, &config);
    let loaded = validate_log(&args.audit_log, &validator);
    for problem in &loaded.diagnostics {
        eprintln!("Error reading audit log: {problem}");
    }
    let report = loaded.value;

    let rendered = match args.format {
        Format::Text => render::validation_text(&report, config.display_limit),
        Format::Json => {
            let mut json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize validation report")?;
            json.push('\n');
            json
        }
    };
    writer::emit(args.output.as_deref(), &rendered)?;

    if !report.passed() {
        eprintln!(
            "Validation FAILED: {} invalid entr{}.",
            report.invalid_entries,
            if report.invalid_entries == 1 { "y" } else { "ies" }
        );
        process::exit(1);
    }

    Ok(())
}
