use std::{
    collections::HashSet,
    ffi::OsString,
    path::{Path, PathBuf},
};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use tokio::sync::mpsc;
use tracing::trace;

use super::ProviderError;

/// A file system event for a watched file.
#[derive(Debug, Clone)]
pub struct FileEvent {
    /// The path of the file that changed
    pub path: PathBuf,
    /// The type of change that occurred
    pub kind: FileEventKind,
}

/// The type of file system change that occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum FileEventKind {
    /// File was modified
    Modified,
    /// File was created
    Created,
    /// File was removed
    Removed,
}

/// Async wrapper over the notify crate for watching individual files.
///
/// Watches the parent directory of each file so that editors replacing a
/// file through a rename are still observed, and forwards only events
/// concerning the watched file names.
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    watched_dirs: HashSet<PathBuf>,
}

impl FileWatcher {
    /// Creates a watcher for `path` and returns it with its event receiver.
    ///
    /// Uses an unbounded channel since file events are typically infrequent
    /// but bursty.
    ///
    /// # Errors
    /// Returns `ProviderError::WatcherInit` if the underlying watcher cannot be
    /// created, and `ProviderError::Watch` if the file's directory cannot be
    /// watched.
    pub fn new(
        path: impl AsRef<Path>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<FileEvent>), ProviderError> {
        let path = path.as_ref();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let file_name = path.file_name().map(OsString::from);

        let watcher = recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else {
                return;
            };

            let kind = match event.kind {
                EventKind::Create(_) => FileEventKind::Created,
                EventKind::Modify(_) => FileEventKind::Modified,
                EventKind::Remove(_) => FileEventKind::Removed,
                _ => return,
            };

            for path in event.paths {
                if file_name.is_some() && path.file_name() != file_name.as_deref() {
                    continue;
                }

                trace!(path = %path.display(), ?kind, "File event");
                let _ = event_tx.send(FileEvent {
                    path,
                    kind: kind.clone(),
                });
            }
        })
        .map_err(|e| ProviderError::WatcherInit {
            details: e.to_string(),
        })?;

        let mut file_watcher = Self {
            watcher,
            watched_dirs: HashSet::new(),
        };
        file_watcher.watch_file(path)?;

        Ok((file_watcher, event_rx))
    }

    /// Starts watching the directory containing `path`.
    ///
    /// If the directory is already being watched, this operation is a no-op.
    ///
    /// # Errors
    /// Returns `ProviderError::Watch` if the directory cannot be watched.
    pub fn watch_file(&mut self, path: impl AsRef<Path>) -> Result<(), ProviderError> {
        let path = path.as_ref();
        let dir = Self::parent_dir(path);

        if self.watched_dirs.contains(&dir) {
            return Ok(());
        }

        self.watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ProviderError::Watch {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;

        self.watched_dirs.insert(dir);

        Ok(())
    }

    /// Stops watching every directory.
    pub fn unwatch_all(&mut self) {
        for dir in self.watched_dirs.drain() {
            let _ = self.watcher.unwatch(&dir);
        }
    }

    fn parent_dir(path: &Path) -> PathBuf {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
