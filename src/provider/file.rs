use std::{
    marker::PhantomData,
    ops::ControlFlow,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::{
    sync::{
        mpsc::{self, Receiver, Sender, UnboundedReceiver},
        oneshot,
    },
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info, instrument, warn};

use super::{FileEvent, FileWatcher, Provider, ProviderError};

/// Settings of a [`FileProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct FileProviderSettings {
    /// The TOML document to watch.
    pub path: PathBuf,
    /// Fixed interval at which the document is re-read.
    pub interval: Duration,
    /// Quiet period after a file system event before the document is re-read.
    pub debounce: Duration,
    /// Whether to react to file system events in addition to polling.
    pub notify: bool,
}

impl FileProviderSettings {
    /// Default polling interval.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
    /// Default debounce window for file system events.
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

    /// Settings for `path` with the default interval and debounce.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            interval: Self::DEFAULT_INTERVAL,
            debounce: Self::DEFAULT_DEBOUNCE,
            notify: true,
        }
    }

    /// Sets the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Enables or disables file system notifications.
    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}

/// Provider backed by a TOML file on disk.
///
/// The file is read once on start, then on every polling tick and after
/// every debounced file system event. A changed document is read a second
/// time one debounce window later and only used if both reads agree; empty
/// documents are ignored. A snapshot is emitted only when the decoded
/// document differs from the last emitted one.
pub struct FileProvider<S> {
    snapshots: Option<Receiver<S>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    watcher: Option<FileWatcher>,
    _snapshot: PhantomData<fn() -> S>,
}

impl<S> FileProvider<S>
where
    S: DeserializeOwned + PartialEq + Clone + Send + 'static,
{
    /// Starts watching the file described by `settings`.
    ///
    /// The file does not need to exist yet; read failures are logged and
    /// retried on the next tick.
    ///
    /// # Errors
    /// Returns an error if file system notifications were requested and the
    /// watcher cannot be set up.
    #[instrument(skip(settings), fields(path = %settings.path.display()))]
    pub fn start(settings: FileProviderSettings) -> Result<Self, ProviderError> {
        let (watcher, file_events) = if settings.notify {
            let (watcher, events) = FileWatcher::new(&settings.path)?;
            (Some(watcher), Some(events))
        } else {
            (None, None)
        };

        let (tx, rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        info!("Starting file provider");
        let task = tokio::spawn(watch_loop(settings, file_events, tx, shutdown_rx));

        Ok(Self {
            snapshots: Some(rx),
            shutdown: Some(shutdown_tx),
            task: Some(task),
            watcher,
            _snapshot: PhantomData,
        })
    }
}

#[async_trait]
impl<S> Provider<S> for FileProvider<S>
where
    S: Send + 'static,
{
    fn watch(&mut self) -> Option<Receiver<S>> {
        self.snapshots.take()
    }

    async fn close(&mut self) -> Result<(), ProviderError> {
        debug!("Stopping file provider");

        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(mut watcher) = self.watcher.take() {
            watcher.unwatch_all();
        }

        match self.task.take() {
            Some(task) => task.await.map_err(|e| ProviderError::Shutdown {
                details: e.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl<S> Drop for FileProvider<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Reads the raw document at `path`.
///
/// # Errors
/// Returns `ProviderError::Read` if the file cannot be read.
pub(super) async fn read_document(path: &Path) -> Result<String, ProviderError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ProviderError::Read {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
}

/// Decodes a TOML document into a snapshot.
///
/// # Errors
/// Returns `ProviderError::Parse` if the document is not valid TOML or does
/// not fit the snapshot type.
pub(super) fn decode<S: DeserializeOwned>(document: &str, path: &Path) -> Result<S, ProviderError> {
    toml::from_str(document).map_err(|e| ProviderError::Parse {
        location: path.display().to_string(),
        details: e.to_string(),
    })
}

const MIN_INTERVAL: Duration = Duration::from_millis(1);

struct LastEmitted<S> {
    document: Option<String>,
    snapshot: Option<S>,
}

async fn watch_loop<S>(
    settings: FileProviderSettings,
    mut file_events: Option<UnboundedReceiver<FileEvent>>,
    tx: Sender<S>,
    mut shutdown: oneshot::Receiver<()>,
) where
    S: DeserializeOwned + PartialEq + Clone + Send + 'static,
{
    let mut last = LastEmitted {
        document: None,
        snapshot: None,
    };

    let mut ticker = tokio::time::interval(settings.interval.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let debounce_sleep = tokio::time::sleep(settings.debounce);
    tokio::pin!(debounce_sleep);
    let mut pending_reload = false;

    loop {
        let flow = tokio::select! {
            _ = &mut shutdown => ControlFlow::Break(()),

            _ = ticker.tick() => reload(&settings, &mut last, &tx, &mut shutdown).await,

            Some(event) = next_file_event(&mut file_events) => {
                debug!(path = %event.path.display(), kind = ?event.kind, "Config file changed");
                pending_reload = true;
                debounce_sleep.as_mut().reset(Instant::now() + settings.debounce);
                ControlFlow::Continue(())
            }

            _ = &mut debounce_sleep, if pending_reload => {
                pending_reload = false;
                reload(&settings, &mut last, &tx, &mut shutdown).await
            }
        };

        if flow.is_break() {
            break;
        }
    }

    debug!(path = %settings.path.display(), "File provider stopped");
}

async fn next_file_event(events: &mut Option<UnboundedReceiver<FileEvent>>) -> Option<FileEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

async fn reload<S>(
    settings: &FileProviderSettings,
    last: &mut LastEmitted<S>,
    tx: &Sender<S>,
    shutdown: &mut oneshot::Receiver<()>,
) -> ControlFlow<()>
where
    S: DeserializeOwned + PartialEq + Clone,
{
    let path = settings.path.as_path();
    let document = match read_document(path).await {
        Ok(document) => document,
        Err(e) => {
            warn!(error = %e, "Cannot read config, keeping last snapshot");
            return ControlFlow::Continue(());
        }
    };

    if last.document.as_deref() == Some(document.as_str()) {
        return ControlFlow::Continue(());
    }

    // Editors truncate before writing; an empty file is never a snapshot.
    if document.trim().is_empty() {
        debug!(path = %path.display(), "Config file is empty, waiting for content");
        return ControlFlow::Continue(());
    }

    tokio::select! {
        _ = &mut *shutdown => return ControlFlow::Break(()),
        _ = tokio::time::sleep(settings.debounce) => {}
    }

    match read_document(path).await {
        Ok(settled) if settled == document => {}
        _ => {
            debug!(path = %path.display(), "Config file still changing, retrying later");
            return ControlFlow::Continue(());
        }
    }

    let snapshot: S = match decode(&document, path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "Cannot decode config, keeping last snapshot");
            last.document = Some(document);
            return ControlFlow::Continue(());
        }
    };
    last.document = Some(document);

    if last.snapshot.as_ref() == Some(&snapshot) {
        return ControlFlow::Continue(());
    }
    last.snapshot = Some(snapshot.clone());

    debug!(path = %path.display(), "Emitting new snapshot");

    tokio::select! {
        _ = shutdown => ControlFlow::Break(()),
        sent = tx.send(snapshot) => match sent {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => {
                debug!("Snapshot receiver dropped");
                ControlFlow::Break(())
            }
        },
    }
}
