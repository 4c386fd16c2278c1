//! Delivers rendered reports to a file or stdout.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Writes `report` to `output`, or to stdout when no output path is given.
///
/// Missing parent directories of `output` are created.
///
/// # Errors
///
/// Returns an error if the report cannot be written.
pub fn emit(output: Option<&Path>, report: &str) -> Result<()> {
    let Some(output) = output else {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(report.as_bytes())
            .and_then(|()| stdout.flush())
            .context("Failed to write report to stdout")?;
        return Ok(());
    };

    if let Some(dir) = output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
    }
    fs::write(output, report)
        .with_context(|| format!("Failed to write report {}", output.display()))?;
    tracing::info!(path = %output.display(), bytes = report.len(), "report written");
    Ok(())
}
