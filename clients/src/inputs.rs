//! Expands command-line inputs into audit-log paths.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extension of audit-log files picked up from directories.
pub const LOG_EXTENSION: &str = "jsonl";

/// Expands each input: files are kept as given, directories are walked for
/// `*.jsonl` files in sorted order. Paths that do not exist are kept so the
/// engine can report them.
pub fn collect_logs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut logs = Vec::new();
    for input in inputs {
        if input.is_dir() {
            logs.extend(walk_logs(input));
        } else {
            logs.push(input.clone());
        }
    }
    logs
}

fn walk_logs(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|x| x == LOG_EXTENSION)
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_are_walked_for_jsonl() {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(e) => unreachable!("cannot create temp dir: {e}"),
        };
        let nested = dir.path().join("nested");
        assert!(std::fs::create_dir(&nested).is_ok());
        for path in [
            dir.path().join("b.jsonl"),
            dir.path().join("a.jsonl"),
            dir.path().join("notes.txt"),
            nested.join("c.jsonl"),
        ] {
            assert!(std::fs::write(&path, "").is_ok());
        }

        let missing = PathBuf::from("/nonexistent/audit.jsonl");
        let logs = collect_logs(&[dir.path().to_path_buf(), missing.clone()]);
        let names: Vec<_> = logs
            .iter()
            .map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();
        assert_eq!(
            names,
            vec![
                Some("a.jsonl".to_string()),
                Some("b.jsonl".to_string()),
                Some("c.jsonl".to_string()),
                Some("audit.jsonl".to_string()),
            ]
        );
        assert_eq!(logs.last(), Some(&missing));
    }
}
