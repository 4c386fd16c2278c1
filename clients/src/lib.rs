//! Shared plumbing for the state-matrix audit binaries: logging setup,
//! input discovery, report rendering, and output.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod inputs;
pub mod render;
pub mod writer;

use tracing_subscriber::EnvFilter;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Human-readable console text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` for the engine
/// when `verbose` is true.
pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "info,smx_engine=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
