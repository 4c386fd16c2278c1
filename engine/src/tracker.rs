//! Previous-state threading across one sequential audit stream.

use crate::record::AuditRecord;
use crate::report::ValidationResult;
use crate::validator::RecordValidator;

/// Carries the last validated state from one record to the next.
///
/// One tracker per stream, fed in file order. Sharing a tracker between
/// streams would validate transitions that never happened.
#[derive(Debug, Default)]
pub struct TransitionTracker {
    previous: Option<String>,
}

impl TransitionTracker {
    /// Creates a tracker with no previous state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `record` against the tracked state and advances it.
    pub fn observe(&mut self, validator: &RecordValidator<'_>, record: &AuditRecord) -> ValidationResult {
        let (result, next) = validator.validate(record, self.previous.as_deref());
        self.previous = next;
        result
    }

    /// The last state established by a valid record.
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Forgets the tracked state, for the start of a new stream.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
