//! State-matrix audit engine.
//!
//! Validates audit-log records against a closed vocabulary of legal states
//! and folds audit streams into summary statistics. Rendering is left to the
//! caller; every report type serializes with serde.
//!
//! # Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`StateVocabulary`] | Legal states, primitives, and contexts; read-only after load |
//! | [`RecordValidator`] | Checks one record; stateless |
//! | [`TransitionTracker`] | Threads the previous state through one stream |
//! | [`StreamAggregator`] | Counters, frequency tables, and performance samples |
//! | [`ValidationReport`] / [`SummaryReport`] | Results for external renderers |
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//! use smx_engine::{validate_log, RecordValidator, StateVocabulary};
//!
//! let vocabulary = StateVocabulary::load(Path::new("state_matrix.csv"));
//! let validator = RecordValidator::new(&vocabulary.value);
//! let report = validate_log(Path::new("audit.jsonl"), &validator);
//! for problem in vocabulary.diagnostics.iter().chain(&report.diagnostics) {
//!     eprintln!("{problem}");
//! }
//! std::process::exit(if report.value.passed() { 0 } else { 1 });
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod aggregator;
pub mod config;
pub mod error;
pub mod record;
pub mod report;
pub mod stats;
pub mod stream;
pub mod tracker;
pub mod validator;
pub mod vocabulary;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

pub use aggregator::{FrequencyTable, StreamAggregator};
pub use config::EngineConfig;
pub use error::{ConfigError, LoadError, RecordParseError};
pub use record::{AuditRecord, Performance, Status};
pub use report::{
    Diagnostic, ErrorAnalysis, Finding, FrequencyEntry, PerformanceReport, Severity,
    SummaryReport, TransitionFault, ValidationReport, ValidationResult,
};
pub use stats::{percentile, LatencySummary, SampleSummary};
pub use stream::{Entry, EntryReader};
pub use tracker::TransitionTracker;
pub use validator::{RecordValidator, TransitionRules};
pub use vocabulary::{derive_state_id, State, StateVocabulary};

/// A value plus the load problems met while producing it.
///
/// An empty vocabulary or a zero-entry report looks the same whether the
/// source was empty or unreadable; `diagnostics` tells them apart.
#[derive(Debug)]
pub struct Loaded<T> {
    /// Whatever could be loaded.
    pub value: T,
    /// Problems encountered, in order.
    pub diagnostics: Vec<LoadError>,
}

impl<T> Loaded<T> {
    /// A fully loaded value.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    /// A partial value with one problem.
    pub fn degraded(value: T, error: LoadError) -> Self {
        Self {
            value,
            diagnostics: vec![error],
        }
    }

    /// Returns true if nothing went wrong.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Validates one audit stream from a reader.
///
/// A fresh [`TransitionTracker`] is used for the stream. A read failure stops
/// the scan and keeps the entries seen so far.
pub fn validate_reader<R: BufRead>(
    reader: R,
    source_name: &str,
    validator: &RecordValidator<'_>,
) -> Loaded<ValidationReport> {
    let mut report = ValidationReport::new();
    let mut tracker = TransitionTracker::new();
    let mut entries = EntryReader::new(reader);
    let mut diagnostics = Vec::new();

    while let Some(entry) = entries.next() {
        match entry {
            Ok(Entry::Record {
                line_number,
                record,
            }) => {
                let result = tracker.observe(validator, &record);
                report.push(line_number, &record, result);
            }
            Ok(Entry::Malformed { line_number, error }) => {
                debug!(source = source_name, line_number, %error, "malformed audit line");
                report.push_malformed(line_number, &error);
            }
            Err(source) => {
                let error = LoadError::Interrupted {
                    source_name: source_name.to_string(),
                    line_number: entries.line_number(),
                    source,
                };
                warn!(%error, "audit stream truncated");
                diagnostics.push(error);
                break;
            }
        }
    }

    info!(
        source = source_name,
        total = report.total_entries,
        valid = report.valid_entries,
        invalid = report.invalid_entries,
        warnings = report.warnings.len(),
        "validated audit stream"
    );

    Loaded {
        value: report,
        diagnostics,
    }
}

/// Validates one audit log on disk.
///
/// A missing or unreadable file yields an empty report with the failure in
/// [`Loaded::diagnostics`].
pub fn validate_log(path: &Path, validator: &RecordValidator<'_>) -> Loaded<ValidationReport> {
    match open(path) {
        Ok(reader) => validate_reader(reader, &path.display().to_string(), validator),
        Err(error) => {
            warn!(%error, "audit log unavailable");
            Loaded::degraded(ValidationReport::new(), error)
        }
    }
}

/// Folds one audit stream into `aggregator`.
///
/// Malformed lines are counted, not fatal.
///
/// # Errors
///
/// Returns [`LoadError::Interrupted`] if the reader fails; everything read
/// before the failure has already been folded in.
pub fn analyze_reader<R: BufRead>(
    reader: R,
    source_name: &str,
    aggregator: &mut StreamAggregator,
) -> Result<(), LoadError> {
    let before = aggregator.total();
    let mut entries = EntryReader::new(reader);

    while let Some(entry) = entries.next() {
        match entry {
            Ok(Entry::Record { record, .. }) => aggregator.observe(&record),
            Ok(Entry::Malformed { line_number, error }) => {
                debug!(source = source_name, line_number, %error, "malformed audit line");
                aggregator.observe_malformed();
            }
            Err(source) => {
                return Err(LoadError::Interrupted {
                    source_name: source_name.to_string(),
                    line_number: entries.line_number(),
                    source,
                })
            }
        }
    }

    info!(
        source = source_name,
        records = aggregator.total() - before,
        "aggregated audit stream"
    );
    Ok(())
}

/// Folds every log in `paths`, in order, into one aggregator.
///
/// Unreadable logs are skipped and reported; the rest are still aggregated.
pub fn analyze_logs<P: AsRef<Path>>(
    paths: &[P],
    aggregator: &mut StreamAggregator,
) -> Vec<LoadError> {
    let mut diagnostics = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let result =
            open(path).and_then(|reader| analyze_reader(reader, &path.display().to_string(), aggregator));
        if let Err(error) = result {
            warn!(%error, "audit log skipped");
            diagnostics.push(error);
        }
    }
    diagnostics
}

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}
