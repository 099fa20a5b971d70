//! Snapshot providers.
//!
//! A provider watches a backing store, decodes the served document into a
//! snapshot, and emits it whenever it differs from the last emission. Fetch
//! and decode failures are logged and skipped; consumers only ever see
//! successfully decoded snapshots.

mod error;
mod file;
mod file_watcher;


use async_trait::async_trait;
use tokio::sync::mpsc::Receiver;

pub use error::ProviderError;
pub use file::{FileProvider, FileProviderSettings};
pub use file_watcher::{FileEvent, FileEventKind, FileWatcher};

/// A source of configuration snapshots.
#[async_trait]
pub trait Provider<S>: Send {
    /// Takes the snapshot stream.
    ///
    /// The stream can be taken once; later calls return `None`. It closes
    /// when the provider is closed.
    fn watch(&mut self) -> Option<Receiver<S>>;

    /// Stops watching and releases every resource held by the provider.
    ///
    /// # Errors
    /// Returns `ProviderError::Shutdown` if the watch task ended abnormally.
    async fn close(&mut self) -> Result<(), ProviderError>;
}
