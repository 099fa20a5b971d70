//! confwatch - Configuration snapshot differ and prefix event router.
//!
//! confwatch turns a stream of configuration snapshots into a stream of
//! fine-grained change events and routes those events to consumers by key
//! prefix. The main features include:
//!
//! - Structural diffing of typed snapshots into dotted-key change events
//! - Set-like deltas for sequences and key-level deltas for mappings
//! - Backpressured prefix routing with composable split stages
//! - A TOML file provider with polling and debounced file-system events
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use confwatch::{
//!     differ::watch,
//!     provider::{FileProvider, FileProviderSettings, Provider},
//!     router::split,
//!     schema::Config,
//! };
//! use tokio_stream::wrappers::ReceiverStream;
//!
//! # async fn run() -> confwatch::Result<()> {
//! let mut provider = FileProvider::<Config>::start(FileProviderSettings::new("config.toml"))?;
//! let Some(snapshots) = provider.watch() else {
//!     return Ok(());
//! };
//!
//! let events = watch(ReceiverStream::new(snapshots));
//! let (mut database, rest) = split(events, "database");
//! confwatch::router::drain(rest);
//!
//! while let Some(event) = database.recv().await {
//!     println!("{} changed", event.key);
//! }
//! # Ok(())
//! # }
//! ```

/// Core error types and result aliases.
pub mod core;

/// Dotted key paths and the key separator.
pub mod key;

/// Change events and their payloads.
pub mod events;

/// Snapshot differ producing change events.
pub mod differ;

/// Prefix filters and split stages routing event streams.
pub mod router;

/// Snapshot providers.
pub mod provider;

/// Reference configuration schema and its topics.
pub mod schema;

/// Command-line interface of the confwatch binary.
pub mod cli;

/// Tracing subscriber setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{ConfwatchError, Result};
