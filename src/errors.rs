//! Error kinds for the lint engine (SPEC_FULL.md §7). Only the
//! non-recoverable kinds are represented here; Violations and the
//! target-not-found / directory-as-file soft errors are absorbed inside the
//! engine and never escape as a `LintError`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LintError {
    #[error("{path}:{line}: malformed directive: {detail}")]
    MalformedDirective {
        path: PathBuf,
        line: u32,
        detail: String,
    },

    #[error(
        "failed to read {}: {source}",
        path.as_deref().map(|p| p.display().to_string()).unwrap_or_else(|| "<stdin>".to_string())
    )]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build worker pool with {parallelism} threads: {source}")]
    PoolBuild {
        parallelism: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("a worker thread panicked while parsing {path}")]
    WorkerPanicked { path: PathBuf },

    #[error("malformed unified diff: {0}")]
    MalformedDiff(String),

    #[error("scan tool '{tool}' exited with unexpected status {status}")]
    ScanTool { tool: String, status: i32 },

    #[error("scan tool '{tool}' could not be resolved: {source}")]
    ScanToolNotFound {
        tool: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// True if `err` represents a missing file (Phase C's target-not-found
/// soft error, per SPEC_FULL.md §7 item 4).
pub fn is_not_found(err: &LintError) -> bool {
    matches!(err, LintError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
}

/// Re-express a worker-pool-cached error (shared via `Arc`, so not owned) as
/// a fresh, owned `LintError` fit to propagate as this invocation's fatal
/// failure. Variants with `Clone`-able fields are reconstructed exactly;
/// others (wrapping a non-`Clone` source like `std::io::Error`) collapse to
/// an `Io` variant carrying the original message text.
pub fn fatal_from(path: &std::path::Path, err: &LintError) -> LintError {
    match err {
        LintError::MalformedDirective { path, line, detail } => LintError::MalformedDirective {
            path: path.clone(),
            line: *line,
            detail: detail.clone(),
        },
        LintError::MalformedDiff(s) => LintError::MalformedDiff(s.clone()),
        LintError::WorkerPanicked { path } => LintError::WorkerPanicked { path: path.clone() },
        other => LintError::Io {
            path: Some(path.to_path_buf()),
            source: std::io::Error::new(std::io::ErrorKind::Other, other.to_string()),
        },
    }
}
