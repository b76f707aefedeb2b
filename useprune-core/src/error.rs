//! Typed error handling for useprune.
//!
//! Every failure aborts the audit: a partially read metadata tree would
//! produce a report that silently omits packages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for useprune operations.
#[derive(Error, Debug)]
pub enum UsePruneError {
    /// A package spec without the `category/` separator
    #[error("Malformed package spec: '{spec}'")]
    MalformedSpec { spec: String },

    /// I/O error when reading the world file or the metadata tree
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// An installed-package record is missing one of its required files
    #[error("Installed package record {dir} has no {file} file")]
    MissingRecordFile { dir: PathBuf, file: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// The target-flag pattern is not a valid regular expression
    #[error("Invalid target flag pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl UsePruneError {
    /// Create a malformed-spec error.
    pub fn malformed(spec: impl Into<String>) -> Self {
        Self::MalformedSpec { spec: spec.into() }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a missing-record-file error.
    pub fn missing_file(dir: impl Into<PathBuf>, file: impl Into<String>) -> Self {
        Self::MissingRecordFile {
            dir: dir.into(),
            file: file.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::MissingRecordFile { dir, .. } => Some(dir),
            Self::Config { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for useprune results.
pub type UsePruneResult<T> = Result<T, UsePruneError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> UsePruneResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> UsePruneResult<T> {
        self.map_err(|e| UsePruneError::io(path, e))
    }
}
