use std::path::PathBuf;

/// Errors raised by snapshot providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The backing document could not be read
    #[error("failed to read '{path}': {details}")]
    Read {
        /// Path of the document
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// The backing document could not be decoded into a snapshot
    #[error("failed to parse TOML from {location}: {details}")]
    Parse {
        /// Location of the TOML (file path, "string", etc.)
        location: String,
        /// Parse error details
        details: String,
    },

    /// Failed to initialize the file watcher
    #[error("failed to initialize file watcher: {details}")]
    WatcherInit {
        /// File watcher initialization error details
        details: String,
    },

    /// Error occurred while watching a specific file
    #[error("file watcher error for '{path}': {details}")]
    Watch {
        /// Path being watched when the error occurred
        path: PathBuf,
        /// File watcher error details
        details: String,
    },

    /// The watch task did not shut down cleanly
    #[error("provider shutdown failed: {details}")]
    Shutdown {
        /// Join error details
        details: String,
    },
}
