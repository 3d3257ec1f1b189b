//! Error types for hamconf
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `Display` and `Error` impls.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Top-level error type for hamconf
#[derive(Error, Debug)]
pub enum Error {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error on {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Attach a path to an I/O error, mapping a missing file to `NotFound`
    pub fn file(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Error::NotFound(path.to_path_buf())
        } else {
            Error::File {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Whether this error means the requested file, section or key is absent
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::Store(StoreError::SectionNotFound(_))
                | Error::Store(StoreError::KeyNotFound { .. })
        )
    }
}

/// Configuration store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Section not found: [{0}]")]
    SectionNotFound(String),

    #[error("Key '{key}' not found in section [{section}]")]
    KeyNotFound { section: String, key: String },

    #[error("Malformed line {line}: {content:?}")]
    Parse { line: usize, content: String },

    #[error("Value {value:?} for [{section}] {key} is not a valid {expected}")]
    Type {
        section: String,
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Store has no file path; use save_to")]
    NoPath,
}

/// Tool configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Failed to create config directory: {0}")]
    DirectoryCreationFailed(PathBuf),
}

/// Date and time formatting errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    #[error("Invalid time: {0:?}")]
    InvalidTime(String),

    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
