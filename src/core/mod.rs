use std::path::PathBuf;

use thiserror::Error;

use crate::provider::ProviderError;

#[cfg(test)]
mod tests;

/// Error types for the confwatch application.
///
/// The diff and routing core never fails; these errors come from the
/// collaborators around it: snapshot providers, logging setup, and the
/// file system.
#[derive(Error, Debug)]
pub enum ConfwatchError {
    /// Snapshot provider failure
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Logging could not be initialized
    #[error("failed to initialize logging: {details}")]
    Logging {
        /// Initialization error details
        details: String,
    },

    /// I/O operation error
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },
}

/// A specialized `Result` type for confwatch operations.
pub type Result<T> = std::result::Result<T, ConfwatchError>;

impl ConfwatchError {
    /// Creates a logging initialization error.
    pub fn logging(error: impl std::fmt::Display) -> Self {
        ConfwatchError::Logging {
            details: error.to_string(),
        }
    }

    /// Creates an I/O error with path context.
    pub fn io(error: impl std::fmt::Display, path: impl Into<PathBuf>) -> Self {
        ConfwatchError::IoError {
            path: path.into(),
            details: error.to_string(),
        }
    }
}
