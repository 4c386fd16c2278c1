//! The closed vocabulary of legal states, loaded once from the reference
//! state matrix and read-only afterwards.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::LoadError;
use crate::Loaded;

/// Column holding the state identifier.
pub const STATE_ID_COLUMN: &str = "state_id";
/// Column holding the primitive.
pub const PRIMITIVE_COLUMN: &str = "primitive";
/// Column holding the context.
pub const CONTEXT_COLUMN: &str = "context";

/// Derives the state identifier for a `(primitive, context)` pair.
///
/// ```
/// assert_eq!(smx_engine::derive_state_id("read", "fs"), "PRIM_read_CTX_fs");
/// ```
#[must_use]
pub fn derive_state_id(primitive: &str, context: &str) -> String {
    format!("PRIM_{primitive}_CTX_{context}")
}

/// One row of the state matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    /// Unique identifier, normally `PRIM_<primitive>_CTX_<context>`.
    pub state_id: String,
    /// Operation category.
    pub primitive: String,
    /// Environment the primitive executes in.
    pub context: String,
    /// Remaining columns of the row, uninterpreted.
    pub metadata: BTreeMap<String, String>,
}

impl State {
    /// Builds a state whose identifier is derived from its primitive and context.
    pub fn new(primitive: impl Into<String>, context: impl Into<String>) -> Self {
        let primitive = primitive.into();
        let context = context.into();
        Self {
            state_id: derive_state_id(&primitive, &context),
            primitive,
            context,
            metadata: BTreeMap::new(),
        }
    }
}

/// Lookup structure over every legal state, primitive, and context.
#[derive(Debug, Default, Clone)]
pub struct StateVocabulary {
    states: HashMap<String, State>,
    primitives: HashSet<String>,
    contexts: HashSet<String>,
}

impl StateVocabulary {
    /// Loads the vocabulary from a CSV state matrix on disk.
    ///
    /// A missing or unreadable file yields an empty vocabulary with the
    /// failure recorded in [`Loaded::diagnostics`]. A table that breaks
    /// part-way keeps the rows read before the break.
    pub fn load(path: &Path) -> Loaded<Self> {
        let mut vocabulary = Self::default();

        if !path.exists() {
            let error = LoadError::NotFound {
                path: path.to_path_buf(),
            };
            warn!(%error, "state matrix unavailable, continuing with an empty vocabulary");
            return Loaded::degraded(vocabulary, error);
        }

        let file = match File::open(path) {
            Ok(file) => file,
            Err(source) => {
                let error = LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                };
                warn!(%error, "state matrix unavailable, continuing with an empty vocabulary");
                return Loaded::degraded(vocabulary, error);
            }
        };

        let mut diagnostics = Vec::new();
        if let Err(source) = vocabulary.read_rows(file) {
            let error = LoadError::Table {
                path: path.to_path_buf(),
                source,
            };
            warn!(%error, states = vocabulary.len(), "state matrix truncated");
            diagnostics.push(error);
        }

        info!(
            path = %path.display(),
            states = vocabulary.len(),
            primitives = vocabulary.primitives.len(),
            contexts = vocabulary.contexts.len(),
            "loaded state matrix"
        );

        Loaded {
            value: vocabulary,
            diagnostics,
        }
    }

    /// Parses a CSV state matrix from any reader.
    ///
    /// # Errors
    ///
    /// Returns the CSV error if the table is malformed.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut vocabulary = Self::default();
        vocabulary.read_rows(reader)?;
        Ok(vocabulary)
    }

    fn read_rows<R: Read>(&mut self, reader: R) -> Result<(), csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = reader.headers()?.clone();

        for row in reader.records() {
            let row = row?;
            let mut state_id = String::new();
            let mut primitive = String::new();
            let mut context = String::new();
            let mut metadata = BTreeMap::new();

            for (column, value) in headers.iter().zip(row.iter()) {
                match column {
                    STATE_ID_COLUMN => state_id = value.to_string(),
                    PRIMITIVE_COLUMN => primitive = value.to_string(),
                    CONTEXT_COLUMN => context = value.to_string(),
                    _ => {
                        metadata.insert(column.to_string(), value.to_string());
                    }
                }
            }

            // Blank separator rows.
            if state_id.is_empty() {
                continue;
            }

            self.insert(State {
                state_id,
                primitive,
                context,
                metadata,
            });
        }

        Ok(())
    }

    fn insert(&mut self, state: State) {
        if !state.primitive.is_empty() {
            self.primitives.insert(state.primitive.clone());
        }
        if !state.context.is_empty() {
            self.contexts.insert(state.context.clone());
        }
        self.states.insert(state.state_id.clone(), state);
    }

    /// Returns true if `state_id` names a legal state.
    pub fn contains(&self, state_id: &str) -> bool {
        self.states.contains_key(state_id)
    }

    /// Returns true if `primitive` appears in at least one legal state.
    pub fn has_primitive(&self, primitive: &str) -> bool {
        self.primitives.contains(primitive)
    }

    /// Returns true if `context` appears in at least one legal state.
    pub fn has_context(&self, context: &str) -> bool {
        self.contexts.contains(context)
    }

    /// Looks up a state by identifier.
    pub fn get(&self, state_id: &str) -> Option<&State> {
        self.states.get(state_id)
    }

    /// Number of legal states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if no states were loaded.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of distinct primitives.
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Number of distinct contexts.
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    /// The first `limit` primitives in sorted order, for diagnostics.
    pub fn primitive_examples(&self, limit: usize) -> Vec<String> {
        sorted_prefix(&self.primitives, limit)
    }

    /// The first `limit` contexts in sorted order, for diagnostics.
    pub fn context_examples(&self, limit: usize) -> Vec<String> {
        sorted_prefix(&self.contexts, limit)
    }
}

impl FromIterator<State> for StateVocabulary {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        let mut vocabulary = Self::default();
        for state in iter.into_iter().filter(|s| !s.state_id.is_empty()) {
            vocabulary.insert(state);
        }
        vocabulary
    }
}

fn sorted_prefix(values: &HashSet<String>, limit: usize) -> Vec<String> {
    let mut sorted: Vec<&String> = values.iter().collect();
    sorted.sort();
    sorted.into_iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATRIX: &str = "\
state_id,primitive,context,layer
PRIM_read_CTX_fs,read,fs,io
PRIM_write_CTX_fs,write,fs,io
,,,
PRIM_read_CTX_net,read,net,io
";

    fn matrix() -> StateVocabulary {
        match StateVocabulary::from_csv_reader(MATRIX.as_bytes()) {
            Ok(v) => v,
            Err(e) => unreachable!("fixture matrix must parse: {e}"),
        }
    }

    #[test]
    fn loads_states_and_derived_sets() {
        let vocabulary = matrix();
        assert_eq!(vocabulary.len(), 3);
        assert_eq!(vocabulary.primitive_count(), 2);
        assert_eq!(vocabulary.context_count(), 2);
        assert!(vocabulary.contains("PRIM_write_CTX_fs"));
        assert!(vocabulary.has_primitive("read"));
        assert!(vocabulary.has_context("net"));
        assert!(!vocabulary.has_primitive("delete"));
    }

    #[test]
    fn blank_rows_are_skipped() {
        let vocabulary = matrix();
        assert!(!vocabulary.contains(""));
    }

    #[test]
    fn extra_columns_are_kept_as_metadata() {
        let vocabulary = matrix();
        let state = vocabulary.get("PRIM_read_CTX_net");
        assert_eq!(
            state.and_then(|s| s.metadata.get("layer")).map(String::as_str),
            Some("io")
        );
    }

    #[test]
    fn examples_are_sorted_and_capped() {
        let vocabulary: StateVocabulary = ["zap", "alpha", "mid", "beta", "omega", "kappa"]
            .into_iter()
            .map(|p| State::new(p, "fs"))
            .collect();
        assert_eq!(
            vocabulary.primitive_examples(5),
            vec!["alpha", "beta", "kappa", "mid", "omega"]
        );
        assert_eq!(vocabulary.context_examples(5), vec!["fs"]);
    }

    #[test]
    fn missing_file_yields_empty_vocabulary_with_diagnostic() {
        let loaded = StateVocabulary::load(Path::new("/nonexistent/state_matrix.csv"));
        assert!(loaded.value.is_empty());
        assert_eq!(loaded.diagnostics.len(), 1);
        assert!(matches!(loaded.diagnostics[0], LoadError::NotFound { .. }));
    }

    #[test]
    fn header_only_table_is_empty_without_diagnostic() {
        let vocabulary = StateVocabulary::from_csv_reader("state_id,primitive,context\n".as_bytes());
        assert!(matches!(vocabulary, Ok(ref v) if v.is_empty()));
    }

    #[test]
    fn broken_row_keeps_the_rows_before_it() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => unreachable!("cannot create temp dir: {e}"),
        };
        let path = dir.path().join("state_matrix.csv");
        let mut table = b"state_id,primitive,context\n\
PRIM_read_CTX_fs,read,fs\n\
PRIM_write_CTX_fs,write,fs\n"
            .to_vec();
        table.extend_from_slice(b"PRIM_\xff_CTX_fs,\xff,fs\n");
        table.extend_from_slice(b"PRIM_read_CTX_net,read,net\n");
        assert!(std::fs::write(&path, &table).is_ok());

        let loaded = StateVocabulary::load(&path);
        assert_eq!(loaded.value.len(), 2);
        assert!(loaded.value.contains("PRIM_write_CTX_fs"));
        assert!(!loaded.value.contains("PRIM_read_CTX_net"));
        assert_eq!(loaded.diagnostics.len(), 1);
        assert!(matches!(loaded.diagnostics[0], LoadError::Table { .. }));
    }
}
