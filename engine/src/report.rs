//! Report types: per-record findings, the validation report, and the
//! statistical summary.
//!
//! Everything here is data. Rendering (console text, JSON, HTML) belongs to
//! the consumer; all types serialize with serde.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::RecordParseError;
use crate::record::AuditRecord;
use crate::stats::{LatencySummary, SampleSummary};

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Data-quality concern; the record still counts as valid.
    Warning,
    /// The record is invalid.
    Failure,
}

/// Why a transition between two consecutive states was questioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "fault", content = "state_id", rename_all = "kebab-case")]
pub enum TransitionFault {
    /// One endpoint is not in the vocabulary.
    UnknownState(String),
    /// Both endpoints exist but the transition graph does not list the edge.
    NotAllowed,
}

/// A single thing wrong with one audit-log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Finding {
    /// The primitive is not part of the vocabulary.
    InvalidPrimitive {
        /// Primitive as logged (empty when absent).
        primitive: String,
        /// Sorted sample of legal primitives.
        examples: Vec<String>,
    },
    /// The context is not part of the vocabulary.
    InvalidContext {
        /// Context as logged (empty when absent).
        context: String,
        /// Sorted sample of legal contexts.
        examples: Vec<String>,
    },
    /// The derived state identifier is not part of the vocabulary.
    InvalidState {
        /// Derived state identifier.
        state_id: String,
    },
    /// The logged state identifier differs from the derived one.
    StateIdMismatch {
        /// State identifier as logged (empty when absent).
        logged: String,
        /// State identifier derived from primitive and context.
        expected: String,
    },
    /// The transition from the previous state is questionable.
    InvalidTransition {
        /// Previous state in this stream.
        from: String,
        /// State of this record.
        to: String,
        /// What failed.
        cause: TransitionFault,
    },
    /// The line could not be parsed into a record.
    Parse {
        /// Parser diagnostic.
        message: String,
    },
}

impl Finding {
    /// Severity of this finding.
    pub fn severity(&self) -> Severity {
        match self {
            Finding::StateIdMismatch { .. } | Finding::InvalidTransition { .. } => {
                Severity::Warning
            }
            _ => Severity::Failure,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::InvalidPrimitive {
                primitive,
                examples,
            } => write!(
                f,
                "Unknown primitive: {primitive}. Available: {}, ...",
                examples.join(", ")
            ),
            Finding::InvalidContext { context, examples } => write!(
                f,
                "Unknown context: {context}. Available: {}, ...",
                examples.join(", ")
            ),
            Finding::InvalidState { state_id } => {
                write!(f, "State ID not found in matrix: {state_id}")
            }
            Finding::StateIdMismatch { logged, expected } => {
                write!(f, "State ID mismatch: got '{logged}', expected '{expected}'")
            }
            Finding::InvalidTransition { from, to, cause } => match cause {
                TransitionFault::UnknownState(state_id) => write!(
                    f,
                    "Transition {from} -> {to}: State ID not found in matrix: {state_id}"
                ),
                TransitionFault::NotAllowed => {
                    write!(f, "Transition {from} -> {to} is not in the transition graph")
                }
            },
            Finding::Parse { message } => f.write_str(message),
        }
    }
}

impl From<&RecordParseError> for Finding {
    fn from(error: &RecordParseError) -> Self {
        Finding::Parse {
            message: error.to_string(),
        }
    }
}

/// Outcome of validating one record: at most one fatal finding plus any
/// number of warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// The first fatal finding, if any.
    pub fatal: Option<Finding>,
    /// Non-fatal findings, in the order they were raised.
    pub warnings: Vec<Finding>,
}

impl ValidationResult {
    /// Returns true if no fatal finding was recorded.
    pub fn is_valid(&self) -> bool {
        self.fatal.is_none()
    }
}

/// A finding tied to its place in the stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// 1-based line number in the audit log.
    pub line_number: usize,
    /// What was found.
    pub reason: Finding,
    /// The offending JSON object; `None` when the line did not parse.
    pub offending_record: Option<Value>,
}

/// Result of validating one audit stream against the vocabulary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Non-blank lines seen.
    pub total_entries: usize,
    /// Lines without a fatal finding.
    pub valid_entries: usize,
    /// Lines with a fatal finding, including unparsable ones.
    pub invalid_entries: usize,
    /// Fatal findings, in stream order.
    pub errors: Vec<Diagnostic>,
    /// Non-fatal findings, in stream order.
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the validation outcome of one parsed line.
    pub fn push(&mut self, line_number: usize, record: &AuditRecord, result: ValidationResult) {
        self.total_entries += 1;
        for warning in result.warnings {
            self.warnings.push(Diagnostic {
                line_number,
                reason: warning,
                offending_record: Some(record.raw().clone()),
            });
        }
        match result.fatal {
            None => self.valid_entries += 1,
            Some(reason) => {
                self.invalid_entries += 1;
                self.errors.push(Diagnostic {
                    line_number,
                    reason,
                    offending_record: Some(record.raw().clone()),
                });
            }
        }
    }

    /// Records a line that could not be parsed.
    pub fn push_malformed(&mut self, line_number: usize, error: &RecordParseError) {
        self.total_entries += 1;
        self.invalid_entries += 1;
        self.errors.push(Diagnostic {
            line_number,
            reason: Finding::from(error),
            offending_record: None,
        });
    }

    /// `valid / total * 100`, or 0 for an empty stream.
    pub fn success_rate(&self) -> f64 {
        percentage(self.valid_entries, self.total_entries)
    }

    /// Returns true if no entry was invalid.
    pub fn passed(&self) -> bool {
        self.invalid_entries == 0
    }
}

/// A value and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    /// The counted value.
    pub value: String,
    /// Number of occurrences.
    pub count: usize,
}

/// Summary statistics for the three performance samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    /// `performance.duration_ms`.
    pub duration_ms: LatencySummary,
    /// `performance.cpu_usage`.
    pub cpu_percent: SampleSummary,
    /// `performance.memory_mb`.
    pub memory_mb: SampleSummary,
}

/// Breakdown of ERROR and CRITICAL records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorAnalysis {
    /// Number of ERROR and CRITICAL records.
    pub total_errors: usize,
    /// Most frequent `result.message` values.
    pub error_types: Vec<FrequencyEntry>,
    /// Most frequent primitives among error records.
    pub error_primitives: Vec<FrequencyEntry>,
    /// The most recent error records, oldest first.
    pub recent_errors: Vec<AuditRecord>,
}

/// Aggregate statistics over one or more audit streams.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    /// Records observed.
    pub total_operations: usize,
    /// SUCCESS records.
    pub successful: usize,
    /// WARN records.
    pub warnings: usize,
    /// ERROR records.
    pub errors: usize,
    /// CRITICAL records.
    pub critical: usize,
    /// Records with a missing or unrecognised status.
    pub unknown: usize,
    /// Lines that could not be parsed; not part of `total_operations`.
    pub malformed_lines: usize,
    /// `successful / total_operations * 100`, or 0 when nothing was observed.
    pub success_rate: f64,
    /// Most frequent primitives.
    pub top_primitives: Vec<FrequencyEntry>,
    /// Most frequent contexts.
    pub top_contexts: Vec<FrequencyEntry>,
    /// Performance statistics.
    pub performance: PerformanceReport,
    /// Error analysis.
    pub error_analysis: ErrorAnalysis,
}

pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
