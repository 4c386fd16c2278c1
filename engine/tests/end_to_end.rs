//! End-to-end scenarios: state matrix and audit logs on disk, driven through
//! the public API.

use std::io::Write;
use std::path::PathBuf;

use smx_engine::{
    analyze_logs, analyze_reader, validate_log, EngineConfig, Finding, LoadError,
    RecordValidator, StateVocabulary, StreamAggregator,
};
use tempfile::TempDir;

const MATRIX: &str = "\
state_id,primitive,context
PRIM_read_CTX_fs,read,fs
PRIM_write_CTX_fs,write,fs
";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let written = std::fs::File::create(&path).and_then(|mut f| f.write_all(contents.as_bytes()));
    assert!(written.is_ok(), "failed to write fixture {name}");
    path
}

fn temp_dir() -> TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => unreachable!("cannot create temp dir: {e}"),
    }
}

#[test]
fn unknown_primitive_is_the_only_invalid_entry() {
    let dir = temp_dir();
    let matrix = write_file(&dir, "state_matrix.csv", MATRIX);
    let log = write_file(
        &dir,
        "audit.jsonl",
        concat!(
            r#"{"primitive":"read","context":"fs","state_id":"PRIM_read_CTX_fs","result":{"status":"SUCCESS"}}"#,
            "\n",
            r#"{"primitive":"delete","context":"fs","state_id":"X","result":{"status":"ERROR"}}"#,
            "\n",
        ),
    );

    let vocabulary = StateVocabulary::load(&matrix);
    assert!(vocabulary.is_clean());
    let validator = RecordValidator::new(&vocabulary.value);
    let loaded = validate_log(&log, &validator);
    assert!(loaded.is_clean());

    let report = loaded.value;
    assert_eq!(report.total_entries, 2);
    assert_eq!(report.valid_entries, 1);
    assert_eq!(report.invalid_entries, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].line_number, 2);
    assert!(matches!(
        report.errors[0].reason,
        Finding::InvalidPrimitive { ref primitive, .. } if primitive == "delete"
    ));
    assert!(report.errors[0].offending_record.is_some());
    assert!(report.warnings.is_empty());
    assert!(!report.passed());
}

#[test]
fn parse_errors_and_mismatches_do_not_stop_the_scan() {
    let dir = temp_dir();
    let matrix = write_file(&dir, "state_matrix.csv", MATRIX);
    let log = write_file(
        &dir,
        "audit.jsonl",
        concat!(
            r#"{"primitive":"read","context":"fs","state_id":"read-fs"}"#,
            "\n",
            "\n",
            "this is not json\n",
            r#"{"primitive":"write","context":"fs","state_id":"PRIM_write_CTX_fs"}"#,
            "\n",
        ),
    );

    let vocabulary = StateVocabulary::load(&matrix).value;
    let validator = RecordValidator::new(&vocabulary);
    let report = validate_log(&log, &validator).value;

    assert_eq!(report.total_entries, 3);
    assert_eq!(report.valid_entries, 2);
    assert_eq!(report.invalid_entries, 1);
    assert_eq!(report.errors[0].line_number, 3);
    assert!(matches!(report.errors[0].reason, Finding::Parse { .. }));
    assert_eq!(report.errors[0].offending_record, None);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].line_number, 1);
    assert!(matches!(
        report.warnings[0].reason,
        Finding::StateIdMismatch { .. }
    ));
}

#[test]
fn explicit_transitions_from_config() {
    let dir = temp_dir();
    let matrix = write_file(&dir, "state_matrix.csv", MATRIX);
    let log = write_file(
        &dir,
        "audit.jsonl",
        concat!(
            r#"{"primitive":"read","context":"fs","state_id":"PRIM_read_CTX_fs"}"#,
            "\n",
            r#"{"primitive":"write","context":"fs","state_id":"PRIM_write_CTX_fs"}"#,
            "\n",
            r#"{"primitive":"read","context":"fs","state_id":"PRIM_read_CTX_fs"}"#,
            "\n",
        ),
    );
    let config = EngineConfig::from_toml_str(
        r#"
        [transitions]
        PRIM_read_CTX_fs = ["PRIM_write_CTX_fs"]
        "#,
    );
    let config = match config {
        Ok(c) => c,
        Err(e) => unreachable!("config must parse: {e}"),
    };

    let vocabulary = StateVocabulary::load(&matrix).value;
    let validator = RecordValidator::with_config(&vocabulary, &config);
    let report = validate_log(&log, &validator).value;

    assert_eq!(report.valid_entries, 3);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].line_number, 3);
    assert!(report.passed());
}

#[test]
fn each_stream_starts_without_a_previous_state() {
    let dir = temp_dir();
    let matrix = write_file(&dir, "state_matrix.csv", MATRIX);
    let line = r#"{"primitive":"write","context":"fs","state_id":"PRIM_write_CTX_fs"}"#;
    let first = write_file(&dir, "a.jsonl", line);
    let second = write_file(&dir, "b.jsonl", line);
    let config = match EngineConfig::from_toml_str("[transitions]\n") {
        Ok(c) => c,
        Err(e) => unreachable!("config must parse: {e}"),
    };

    let vocabulary = StateVocabulary::load(&matrix).value;
    let validator = RecordValidator::with_config(&vocabulary, &config);
    for log in [first, second] {
        let report = validate_log(&log, &validator).value;
        // An empty graph allows nothing, so any carried-over state would warn.
        assert!(report.warnings.is_empty());
    }
}

#[test]
fn missing_matrix_is_reported_on_the_diagnostic_channel() {
    let dir = temp_dir();
    let loaded = StateVocabulary::load(&dir.path().join("absent.csv"));
    assert!(loaded.value.is_empty());
    assert!(matches!(
        loaded.diagnostics.as_slice(),
        [LoadError::NotFound { .. }]
    ));

    let empty = write_file(&dir, "empty.csv", "state_id,primitive,context\n");
    let loaded = StateVocabulary::load(&empty);
    assert!(loaded.value.is_empty());
    assert!(loaded.is_clean());
}

#[test]
fn hundred_durations_summarize_with_nearest_rank() {
    let mut log = String::new();
    for ms in 1..=100 {
        log.push_str(&format!(
            "{{\"primitive\":\"read\",\"context\":\"fs\",\"result\":{{\"status\":\"SUCCESS\"}},\"performance\":{{\"duration_ms\":{ms}}}}}\n"
        ));
    }
    let mut aggregator = StreamAggregator::new();
    let result = analyze_reader(log.as_bytes(), "inline", &mut aggregator);
    assert!(result.is_ok());

    let summary = aggregator.summarize();
    assert_eq!(summary.total_operations, 100);
    assert_eq!(summary.success_rate, 100.0);
    let duration = summary.performance.duration_ms;
    assert_eq!(duration.avg, 50.5);
    assert_eq!(duration.min, 1.0);
    assert_eq!(duration.max, 100.0);
    // Nearest rank is sorted[min(floor(n * p), n - 1)]: 96 and 100 here, not
    // 95 and 99. The formula is the compatibility contract; keep these values.
    assert_eq!(duration.p95, 96.0);
    assert_eq!(duration.p99, 100.0);
    assert_eq!(summary.performance.cpu_percent.count, 0);
}

#[test]
fn multiple_logs_fold_into_one_summary() {
    let dir = temp_dir();
    let first = write_file(
        &dir,
        "a.jsonl",
        concat!(
            r#"{"primitive":"read","context":"fs","result":{"status":"SUCCESS"}}"#,
            "\n",
            r#"{"primitive":"write","context":"fs","result":{"status":"ERROR","message":"denied"}}"#,
            "\n",
        ),
    );
    let second = write_file(
        &dir,
        "b.jsonl",
        concat!(
            r#"{"primitive":"write","context":"net","result":{"status":"SUCCESS"}}"#,
            "\n",
            "{broken\n",
        ),
    );
    let missing = dir.path().join("missing.jsonl");

    let mut aggregator = StreamAggregator::new();
    let diagnostics = analyze_logs(&[first, missing, second], &mut aggregator);
    assert_eq!(diagnostics.len(), 1);

    let summary = aggregator.summarize();
    assert_eq!(summary.total_operations, 3);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.malformed_lines, 1);
    assert_eq!(summary.top_primitives[0].value, "write");
    assert_eq!(summary.top_primitives[0].count, 2);
    assert_eq!(summary.top_contexts[0].value, "fs");
    assert_eq!(summary.error_analysis.error_types[0].value, "denied");
}

#[test]
fn mistyped_descriptive_fields_keep_the_entry() {
    let dir = temp_dir();
    let matrix = write_file(&dir, "state_matrix.csv", MATRIX);
    let log = write_file(
        &dir,
        "audit.jsonl",
        concat!(
            r#"{"primitive":"read","context":"fs","state_id":"PRIM_read_CTX_fs","result":{"status":"ERROR","message":42}}"#,
            "\n",
            r#"{"primitive":"read","context":"fs","state_id":"PRIM_read_CTX_fs","performance":{"duration_ms":"12"}}"#,
            "\n",
            r#"{"primitive":"read","context":"fs","state_id":123}"#,
            "\n",
        ),
    );

    let vocabulary = StateVocabulary::load(&matrix);
    let validator = RecordValidator::new(&vocabulary.value);
    let report = validate_log(&log, &validator).value;
    assert_eq!(report.total_entries, 3);
    assert_eq!(report.valid_entries, 3);
    assert_eq!(report.invalid_entries, 0);
    assert!(report.errors.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].line_number, 3);
    assert!(matches!(
        report.warnings[0].reason,
        Finding::StateIdMismatch { ref logged, .. } if logged == "123"
    ));
    assert!(report.passed());

    let mut aggregator = StreamAggregator::new();
    assert!(analyze_logs(&[&log], &mut aggregator).is_empty());
    let summary = aggregator.summarize();
    assert_eq!(summary.total_operations, 3);
    assert_eq!(summary.malformed_lines, 0);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.error_analysis.error_types[0].value, "42");
    assert_eq!(summary.performance.duration_ms.count, 0);
}
