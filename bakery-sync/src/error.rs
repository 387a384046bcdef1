//! Error types for bakery-sync.

use std::path::PathBuf;

use thiserror::Error;

use bakery_core::SettingsError;

/// Errors that stop a whole run.
///
/// Per-reference and per-file problems never surface here; they are logged
/// and skipped.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Settings could not be loaded or failed validation.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The version oracle could not be queried at all.
    #[error("version oracle unavailable: {0}")]
    Oracle(#[from] OracleError),

    #[error("batch size must be at least 1")]
    InvalidBatchSize,
}

/// Failures talking to the version oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("I/O error reading catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{0}")]
    Unavailable(String),
}

/// Failure of one bake call.
#[derive(Debug, Error)]
pub enum BakeError {
    #[error("failed to start baker {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("baker {program} exited with {status}: {stderr}")]
    Failed {
        program: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Why an artifact filename was not indexed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    #[error("expected extension .{expected}")]
    WrongExtension { expected: String },

    #[error("expected 3 underscore-separated segments, found {found}")]
    SegmentCount { found: usize },

    #[error("empty key segment")]
    EmptyKey,

    #[error("bad version tag '{tag}' (expected v<integer>)")]
    BadVersion { tag: String },

    #[error("bad dimensions tag '{tag}' (expected <width>x<height>)")]
    BadDimensions { tag: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
