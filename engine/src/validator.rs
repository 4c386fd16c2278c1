//! Per-record validation against the state vocabulary.
//!
//! Checks run in a fixed order and stop at the first fatal finding:
//!
//! 1. primitive is known
//! 2. context is known
//! 3. logged `state_id` matches the derived one (warning only)
//! 4. derived state is known
//! 5. transition from the previous state is legal (warning only)

use std::collections::{HashMap, HashSet};

use crate::config::EngineConfig;
use crate::record::AuditRecord;
use crate::report::{Finding, TransitionFault, ValidationResult};
use crate::vocabulary::{derive_state_id, StateVocabulary};

/// Which transitions between known states are legal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransitionRules {
    /// Any transition between two known states.
    #[default]
    AcceptAll,
    /// Only the listed `from -> to` edges.
    Explicit(HashMap<String, HashSet<String>>),
}

impl TransitionRules {
    /// Builds an explicit graph from `(from, to)` edges.
    pub fn explicit<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut graph: HashMap<String, HashSet<String>> = HashMap::new();
        for (from, to) in edges {
            graph.entry(from).or_default().insert(to);
        }
        TransitionRules::Explicit(graph)
    }

    /// Returns true if the graph permits `from -> to`. Endpoints are not checked.
    pub fn allows(&self, from: &str, to: &str) -> bool {
        match self {
            TransitionRules::AcceptAll => true,
            TransitionRules::Explicit(graph) => {
                graph.get(from).is_some_and(|targets| targets.contains(to))
            }
        }
    }

    /// Checks both endpoints against `vocabulary`, then the edge itself.
    ///
    /// # Errors
    ///
    /// Returns the first fault found.
    pub fn check(
        &self,
        vocabulary: &StateVocabulary,
        from: &str,
        to: &str,
    ) -> Result<(), TransitionFault> {
        for endpoint in [from, to] {
            if !vocabulary.contains(endpoint) {
                return Err(TransitionFault::UnknownState(endpoint.to_string()));
            }
        }
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(TransitionFault::NotAllowed)
        }
    }
}

/// Validates records against a shared, read-only vocabulary.
///
/// Holds no per-stream state: the previous state is passed in and the next
/// one handed back. See [`crate::TransitionTracker`] for the stateful wrapper.
#[derive(Debug, Clone)]
pub struct RecordValidator<'v> {
    vocabulary: &'v StateVocabulary,
    rules: TransitionRules,
    suggestion_limit: usize,
}

impl<'v> RecordValidator<'v> {
    /// Creates a validator that accepts every transition between known states.
    pub fn new(vocabulary: &'v StateVocabulary) -> Self {
        Self {
            vocabulary,
            rules: TransitionRules::AcceptAll,
            suggestion_limit: EngineConfig::default().suggestion_limit,
        }
    }

    /// Creates a validator using the rules and limits in `config`.
    pub fn with_config(vocabulary: &'v StateVocabulary, config: &EngineConfig) -> Self {
        Self {
            vocabulary,
            rules: config.transition_rules(),
            suggestion_limit: config.suggestion_limit,
        }
    }

    /// Replaces the transition rules.
    #[must_use]
    pub fn with_rules(mut self, rules: TransitionRules) -> Self {
        self.rules = rules;
        self
    }

    /// The vocabulary this validator checks against.
    pub fn vocabulary(&self) -> &'v StateVocabulary {
        self.vocabulary
    }

    /// Validates one record given the previous state of its stream.
    ///
    /// Returns the result and the state to carry to the next record: the
    /// derived state when the record is valid, `previous` unchanged when it
    /// is not.
    pub fn validate(
        &self,
        record: &AuditRecord,
        previous: Option<&str>,
    ) -> (ValidationResult, Option<String>) {
        let retained = previous.map(str::to_string);
        let mut result = ValidationResult::default();

        let primitive = record.primitive.as_deref().unwrap_or_default();
        if !self.vocabulary.has_primitive(primitive) {
            result.fatal = Some(Finding::InvalidPrimitive {
                primitive: primitive.to_string(),
                examples: self.vocabulary.primitive_examples(self.suggestion_limit),
            });
            return (result, retained);
        }

        let context = record.context.as_deref().unwrap_or_default();
        if !self.vocabulary.has_context(context) {
            result.fatal = Some(Finding::InvalidContext {
                context: context.to_string(),
                examples: self.vocabulary.context_examples(self.suggestion_limit),
            });
            return (result, retained);
        }

        let expected = derive_state_id(primitive, context);
        let logged = record.state_id.as_deref().unwrap_or_default();
        if logged != expected {
            result.warnings.push(Finding::StateIdMismatch {
                logged: logged.to_string(),
                expected: expected.clone(),
            });
        }

        if !self.vocabulary.contains(&expected) {
            result.fatal = Some(Finding::InvalidState { state_id: expected });
            return (result, retained);
        }

        if let Some(from) = previous.filter(|p| !p.is_empty()) {
            if let Err(cause) = self.rules.check(self.vocabulary, from, &expected) {
                result.warnings.push(Finding::InvalidTransition {
                    from: from.to_string(),
                    to: expected.clone(),
                    cause,
                });
            }
        }

        (result, Some(expected))
    }
}
