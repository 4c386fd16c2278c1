//! Engine configuration, read from an optional TOML file.
//!
//! ```toml
//! top_k = 10
//! recent_errors = 10
//! suggestion_limit = 5
//! display_limit = 10
//!
//! [transitions]
//! PRIM_read_CTX_fs = ["PRIM_write_CTX_fs", "PRIM_read_CTX_fs"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::validator::TransitionRules;

/// Tunables for validation and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Size of every frequency table in the summary.
    pub top_k: usize,
    /// How many recent error records the summary keeps.
    pub recent_errors: usize,
    /// How many legal primitives/contexts an unknown-value finding lists.
    pub suggestion_limit: usize,
    /// How many errors and warnings a textual rendering shows.
    pub display_limit: usize,
    /// Explicit transition graph; `None` accepts every transition between
    /// known states.
    pub transitions: Option<BTreeMap<String, Vec<String>>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            recent_errors: 10,
            suggestion_limit: 5,
            display_limit: 10,
            transitions: None,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML, names an unknown
    /// key, or holds an out-of-range value.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("top_k", self.top_k),
            ("recent_errors", self.recent_errors),
            ("display_limit", self.display_limit),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Transition rules described by this configuration.
    pub fn transition_rules(&self) -> TransitionRules {
        match &self.transitions {
            None => TransitionRules::AcceptAll,
            Some(graph) => TransitionRules::explicit(
                graph
                    .iter()
                    .flat_map(|(from, tos)| tos.iter().map(move |to| (from.clone(), to.clone()))),
            ),
        }
    }
}
