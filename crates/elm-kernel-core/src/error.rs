//! Error types for elm-kernel-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for elm-kernel-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in elm-kernel-core.
///
/// A compiler that runs and exits non-zero is not an error; it is reported
/// through [`CompileOutcome::CompileFailure`](crate::compiler::CompileOutcome).
/// Every variant here is an infrastructure failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem operation failed.
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Compiler executable could not be located.
    #[error("compiler not found: {0}")]
    CompilerNotFound(String),

    /// Compiler process could not be started or waited on.
    #[error("failed to run {program}: {message}")]
    CompilerLaunch { program: String, message: String },

    /// Compiler reported success but produced no output file.
    #[error("compiler output missing: {0}")]
    MissingOutput(PathBuf),

    /// Project manifest could not be staged.
    #[error("could not stage manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Notebook document is malformed.
    #[error("invalid notebook: {0}")]
    Notebook(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap an IO error with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
