//! Command implementations for CLI tools.
//!
//! Each module contains the full implementation for a command,
//! which can be invoked by thin wrapper binaries.

pub mod payable_cmd;
pub mod report_cmd;

use anyhow::{Context, Result};
use ownersplit_loader::{LoadResult, Loader};
use std::path::Path;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Workspace crates whose events are shown with `--verbose`.
const VERBOSE_TARGETS: &[&str] = &[
    "ownersplit=debug",
    "ownersplit_core=debug",
    "ownersplit_engine=debug",
    "ownersplit_loader=debug",
];

/// Install the stderr log subscriber.
///
/// `RUST_LOG` is honoured; without it only errors are logged, since the
/// commands print their own warnings.
pub(crate) fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    if verbose {
        for target in VERBOSE_TARGETS {
            if let Ok(directive) = target.parse::<Directive>() {
                filter = filter.add_directive(directive);
            }
        }
    }

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load snapshots from `path`.
pub(crate) fn load_snapshots(path: &Path, recursive: bool) -> Result<LoadResult> {
    if !path.exists() {
        anyhow::bail!("path not found: {}", path.display());
    }

    tracing::info!(path = %path.display(), recursive, "loading snapshots");
    Loader::new()
        .with_recursive(recursive)
        .load(path)
        .with_context(|| format!("failed to load {}", path.display()))
}

/// Print load errors and option warnings to stderr.
pub(crate) fn print_load_warnings(result: &LoadResult) {
    for error in &result.errors {
        eprintln!("warning: {error}");
    }
    for warning in &result.options.warnings {
        eprintln!("warning: {warning}");
    }
}
