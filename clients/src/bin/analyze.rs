//! `smx-analyze` — Aggregates audit logs into summary statistics.
//!
//! Reports status breakdown, success rate, most frequent primitives and
//! contexts, duration/CPU/memory statistics, and an error breakdown.
//!
//! **Usage:**
//! ```
//! smx-analyze --input <file-or-dir>... [--output <path>] [--format text|json]
//! ```
//!
//! Exits non-zero if no audit log could be found.

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
use smx_clients::{init_logging, inputs, render, writer, Format};
use smx_engine::{analyze_logs, EngineConfig, StreamAggregator};

/// Analyze audit logs and summarize them.
#[derive(Parser)]
#[command(name = "smx-analyze", about = "Summarize audit logs")]
struct Args {
    /// Audit log files, or directories to search for `*.jsonl`.
    #[arg(long, num_args = 1.., required = true)]
    input: Vec<PathBuf>,

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

    let logs = inputs::collect_logs(&args.input);
    if logs.is_empty() {
        eprintln!("No audit log files found!");
        process::exit(1);
    }

    let mut aggregator = StreamAggregator::with_config(&config);
    for problem in analyze_logs(&logs, &mut aggregator) {
        eprintln!("Error loading audit log: {problem}");
    }
    let summary = aggregator.summarize();

    let rendered = match args.format {
        Format::Text => render::summary_text(&summary),
        Format::Json => {
            let mut json = serde_json::to_string_pretty(&summary)
                .context("Failed to serialize summary report")?;
            json.push('\n');
            json
        }
    };
    writer::emit(args.output.as_deref(), &rendered)?;

    Ok(())
}
