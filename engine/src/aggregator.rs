//! Streaming aggregation of audit records into counters and samples.

use std::collections::{HashMap, VecDeque};

use crate::config::EngineConfig;
use crate::record::{AuditRecord, Status};
use crate::report::{
    percentage, ErrorAnalysis, FrequencyEntry, PerformanceReport, SummaryReport,
};
use crate::stats::Sample;

/// Label used when a record has no primitive or context.
pub const UNKNOWN_LABEL: &str = "unknown";
/// Label used when an error record has no message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Occurrence counter that remembers first-seen order.
///
/// [`FrequencyTable::most_common`] ranks by descending count and breaks
/// ties by first occurrence.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `value`.
    pub fn add(&mut self, value: &str) {
        match self.index.get(value) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(value.to_string(), self.entries.len());
                self.entries.push((value.to_string(), 1));
            }
        }
    }

    /// Occurrences of `value`.
    pub fn count(&self, value: &str) -> usize {
        self.index
            .get(value)
            .map_or(0, |&slot| self.entries[slot].1)
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `limit` most frequent values.
    pub fn most_common(&self, limit: usize) -> Vec<FrequencyEntry> {
        let mut ranked: Vec<&(String, usize)> = self.entries.iter().collect();
        // Stable: equal counts keep first-seen order.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(limit)
            .map(|(value, count)| FrequencyEntry {
                value: value.clone(),
                count: *count,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct StatusCounts {
    success: usize,
    warn: usize,
    error: usize,
    critical: usize,
    unknown: usize,
}

impl StatusCounts {
    fn add(&mut self, status: Status) {
        match status {
            Status::Success => self.success += 1,
            Status::Warn => self.warn += 1,
            Status::Error => self.error += 1,
            Status::Critical => self.critical += 1,
            Status::Unknown => self.unknown += 1,
        }
    }
}

/// Running aggregate over a stream of audit records.
///
/// Counters are fixed-size per distinct value; the three performance
/// samples keep every observation until [`StreamAggregator::summarize`].
#[derive(Debug, Clone)]
pub struct StreamAggregator {
    top_k: usize,
    recent_capacity: usize,
    total: usize,
    malformed: usize,
    statuses: StatusCounts,
    primitives: FrequencyTable,
    contexts: FrequencyTable,
    durations: Sample,
    cpu: Sample,
    memory: Sample,
    total_errors: usize,
    error_types: FrequencyTable,
    error_primitives: FrequencyTable,
    recent_errors: VecDeque<AuditRecord>,
}

impl Default for StreamAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAggregator {
    /// Creates an aggregator with the default table sizes (top 10, last 10 errors).
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Creates an aggregator sized by `config`.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            top_k: config.top_k,
            recent_capacity: config.recent_errors,
            total: 0,
            malformed: 0,
            statuses: StatusCounts::default(),
            primitives: FrequencyTable::new(),
            contexts: FrequencyTable::new(),
            durations: Sample::new(),
            cpu: Sample::new(),
            memory: Sample::new(),
            total_errors: 0,
            error_types: FrequencyTable::new(),
            error_primitives: FrequencyTable::new(),
            recent_errors: VecDeque::with_capacity(config.recent_errors),
        }
    }

    /// Folds one record into the aggregate. Validity is not required.
    pub fn observe(&mut self, record: &AuditRecord) {
        self.total += 1;
        self.statuses.add(record.status);

        let primitive = record.primitive.as_deref().unwrap_or(UNKNOWN_LABEL);
        self.primitives.add(primitive);
        self.contexts
            .add(record.context.as_deref().unwrap_or(UNKNOWN_LABEL));

        self.durations.push_opt(record.performance.duration_ms);
        self.cpu.push_opt(record.performance.cpu_usage);
        self.memory.push_opt(record.performance.memory_mb);

        if record.status.is_error() {
            self.total_errors += 1;
            self.error_types
                .add(record.message.as_deref().unwrap_or(UNKNOWN_ERROR));
            self.error_primitives.add(primitive);
            if self.recent_capacity > 0 {
                if self.recent_errors.len() == self.recent_capacity {
                    self.recent_errors.pop_front();
                }
                self.recent_errors.push_back(record.clone());
            }
        }
    }

    /// Counts a line that could not be parsed.
    pub fn observe_malformed(&mut self) {
        self.malformed += 1;
    }

    /// Records observed so far.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Computes the summary. Does not reset the aggregate.
    pub fn summarize(&self) -> SummaryReport {
        SummaryReport {
            total_operations: self.total,
            successful: self.statuses.success,
            warnings: self.statuses.warn,
            errors: self.statuses.error,
            critical: self.statuses.critical,
            unknown: self.statuses.unknown,
            malformed_lines: self.malformed,
            success_rate: percentage(self.statuses.success, self.total),
            top_primitives: self.primitives.most_common(self.top_k),
            top_contexts: self.contexts.most_common(self.top_k),
            performance: PerformanceReport {
                duration_ms: self.durations.latency_summary(),
                cpu_percent: self.cpu.summary(),
                memory_mb: self.memory.summary(),
            },
            error_analysis: ErrorAnalysis {
                total_errors: self.total_errors,
                error_types: self.error_types.most_common(self.top_k),
                error_primitives: self.error_primitives.most_common(self.top_k),
                recent_errors: self.recent_errors.iter().cloned().collect(),
            },
        }
    }
}
