//! Audit records: one logged operation per JSON line.
//!
//! Parsing is lenient: every field is optional, and only a non-object line
//! or a non-string `primitive`/`context` rejects the line.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::RecordParseError;

/// Outcome status of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Completed normally.
    Success,
    /// Completed with a warning.
    Warn,
    /// Failed.
    Error,
    /// Failed in a way that compromises the system.
    Critical,
    /// Missing or unrecognised status.
    Unknown,
}

impl Status {
    /// Parses a logged status string. Anything unrecognised is [`Status::Unknown`].
    pub fn parse(value: &str) -> Self {
        match value {
            "SUCCESS" => Status::Success,
            "WARN" => Status::Warn,
            "ERROR" => Status::Error,
            "CRITICAL" => Status::Critical,
            _ => Status::Unknown,
        }
    }

    /// The canonical upper-case spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::Warn => "WARN",
            Status::Error => "ERROR",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }

    /// True for ERROR and CRITICAL, the statuses that feed error analysis.
    pub fn is_error(self) -> bool {
        matches!(self, Status::Error | Status::Critical)
    }
}

/// Optional performance measurements attached to a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Performance {
    /// Wall-clock duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// CPU usage in percent.
    pub cpu_usage: Option<f64>,
    /// Resident memory in megabytes.
    pub memory_mb: Option<f64>,
}

/// One logged operation.
///
/// Serializes as the JSON object it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    /// Operation category, as logged.
    pub primitive: Option<String>,
    /// Execution context, as logged.
    pub context: Option<String>,
    /// State identifier, as logged. May differ from the derived one.
    pub state_id: Option<String>,
    /// `result.status`.
    pub status: Status,
    /// `result.message`.
    pub message: Option<String>,
    /// `performance.*`.
    pub performance: Performance,
    raw: Value,
}

impl AuditRecord {
    /// Parses one line of an audit log.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not a JSON object or `primitive` or
    /// `context` is not a string.
    pub fn parse(line: &str) -> Result<Self, RecordParseError> {
        let value: Value = serde_json::from_str(line)?;
        Self::from_value(value)
    }

    /// Builds a record from an already-parsed JSON value.
    ///
    /// Besides the nested `result`/`performance` layout this accepts the flat
    /// layout written by the native audit writer: `success` (bool),
    /// `error_msg`, and a top-level `duration_ms`.
    ///
    /// Only `primitive` and `context` decide validity, so only they are held
    /// to a type. A non-string `state_id` or `message` keeps its JSON text;
    /// a mistyped status, measurement, or section reads as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object or `primitive` or
    /// `context` is not a string.
    pub fn from_value(value: Value) -> Result<Self, RecordParseError> {
        let object = match &value {
            Value::Object(object) => object,
            other => {
                return Err(RecordParseError::NotAnObject {
                    found: json_kind(other),
                })
            }
        };

        let primitive = string_field(object, "primitive")?;
        let context = string_field(object, "context")?;
        let state_id = text_field(object, "state_id");

        let (status, message) = match object.get("result") {
            Some(Value::Object(result)) => {
                let status = match result.get("status") {
                    Some(Value::String(s)) => Status::parse(s),
                    _ => Status::Unknown,
                };
                (status, text_field(result, "message"))
            }
            _ => legacy_result(object),
        };

        let mut performance = match object.get("performance") {
            Some(Value::Object(perf)) => Performance {
                duration_ms: number_field(perf, "duration_ms"),
                cpu_usage: number_field(perf, "cpu_usage"),
                memory_mb: number_field(perf, "memory_mb"),
            },
            _ => Performance::default(),
        };
        if performance.duration_ms.is_none() {
            performance.duration_ms = number_field(object, "duration_ms");
        }

        Ok(Self {
            primitive,
            context,
            state_id,
            status,
            message,
            performance,
            raw: value,
        })
    }

    /// The JSON object this record was parsed from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for AuditRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Flat-layout status: `success` decides SUCCESS/ERROR, `error_msg` is the message.
fn legacy_result(object: &Map<String, Value>) -> (Status, Option<String>) {
    let status = match object.get("success") {
        Some(Value::Bool(true)) => Status::Success,
        Some(Value::Bool(false)) => Status::Error,
        _ => Status::Unknown,
    };
    (status, text_field(object, "error_msg"))
}

fn string_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, RecordParseError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RecordParseError::FieldType {
            field,
            expected: "string",
        }),
    }
}

/// Strings as-is, other non-null values as their JSON text.
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn number_field(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object.get(key).and_then(Value::as_f64)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
