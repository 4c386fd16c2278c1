//! Typed errors for the engine's load, parse, and configuration paths.
//!
//! None of these abort a scan. Load errors travel on the diagnostic channel
//! ([`crate::Loaded`]); record parse errors become invalid entries.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to open or read an input source (vocabulary table or audit log).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source path does not exist.
    #[error("source not found: {}", .path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// The source exists but could not be opened or read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The reference table is not well-formed CSV.
    #[error("malformed state matrix {}: {source}", .path.display())]
    Table {
        /// Path of the reference table.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Reading stopped part-way through an audit stream.
    #[error("read failed after line {line_number} of {source_name}: {source}")]
    Interrupted {
        /// Display name of the stream.
        source_name: String,
        /// Last line successfully read.
        line_number: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure to turn one audit-log line into an [`crate::AuditRecord`].
#[derive(Debug, Error)]
pub enum RecordParseError {
    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    Encoding,

    /// The line is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The line is valid JSON but not an object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// JSON kind that was found instead.
        found: &'static str,
    },

    /// A known field has the wrong JSON type.
    #[error("field `{field}` has the wrong type: expected {expected}")]
    FieldType {
        /// Dotted field path.
        field: &'static str,
        /// Expected JSON kind.
        expected: &'static str,
    },
}

/// Failure to load or validate an [`crate::EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for [`crate::EngineConfig`].
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is outside its allowed range.
    #[error("invalid config value for `{key}`: {reason}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
