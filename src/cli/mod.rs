//! Command-line interface of the `confwatch` binary.
//!
//! Arguments select the watched document, the reload timing, the topics to
//! route events into, and how events are printed.

pub mod formatting;


use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

use crate::{provider::FileProviderSettings, schema};

/// How routed events are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One colored line per event.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Watches a TOML configuration file and prints its change events by topic.
#[derive(Debug, Parser)]
#[command(name = "confwatch", version, about)]
pub struct Args {
    /// Configuration document to watch.
    #[arg(short, long, default_value = "config.toml")]
    pub file: PathBuf,

    /// Seconds between polls of the document.
    #[arg(long, default_value_t = FileProviderSettings::DEFAULT_INTERVAL.as_secs_f64())]
    pub interval: f64,

    /// Milliseconds to wait after a file-system event before reloading.
    #[arg(long, default_value_t = FileProviderSettings::DEFAULT_DEBOUNCE.as_millis() as u64)]
    pub debounce: u64,

    /// Topic filter to route events into (dotted key prefix). Repeatable.
    ///
    /// Topics claim events in the given order, so list specific topics
    /// before their parents. Defaults to every section of the schema.
    #[arg(short, long = "topic", value_name = "TOPIC")]
    pub topics: Vec<String>,

    /// Directory for daily rolling log files.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Output format of routed events.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

impl Args {
    /// Provider settings derived from the arguments.
    ///
    /// Negative or non-finite intervals fall back to the default.
    pub fn provider_settings(&self) -> FileProviderSettings {
        let interval = Duration::try_from_secs_f64(self.interval)
            .unwrap_or(FileProviderSettings::DEFAULT_INTERVAL);

        FileProviderSettings::new(self.file.clone())
            .with_interval(interval)
            .with_debounce(Duration::from_millis(self.debounce))
    }

    /// The requested topics, or every schema topic if none were given.
    pub fn topics(&self) -> Vec<String> {
        if self.topics.is_empty() {
            return schema::topics::ALL.iter().map(|t| t.to_string()).collect();
        }

        self.topics.clone()
    }
}
