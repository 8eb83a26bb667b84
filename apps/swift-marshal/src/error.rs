//! Error types for swift-marshal.
//!
//! Every failure surfaced by the pipeline is fatal for the file it concerns
//! and, through the fail-fast batch, for the whole invocation. Configuration
//! ambiguity is never an error; the loader resolves it to wildcards.

use std::path::PathBuf;
use thiserror::Error;

/// Structural parse failure for one source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line where the problem was detected.
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Failures while locating or reading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The top-level error type for check/fix/init operations.
#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid invocation detected before any file is processed.
    #[error("{0}")]
    Validation(String),

    #[error("configuration file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

impl MarshalError {
    /// Returns the process exit code for this error.
    ///
    /// Exit code 1 is reserved for "files need reordering"; every error maps
    /// to 2.
    pub fn exit_code(&self) -> u8 {
        2
    }
}

/// Result type alias using MarshalError.
pub type MarshalResult<T> = Result<T, MarshalError>;
