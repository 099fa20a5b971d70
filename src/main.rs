//! confwatch - Watches a TOML configuration file and prints its change events.
//!
//! Snapshots flow from the file provider through the differ into a chain of
//! topic routers. Each requested topic gets a printer; events no topic claims
//! are drained.

use std::{error::Error, process};

use clap::Parser;
use confwatch::{
    cli::{
        Args, OutputFormat,
        formatting::{format_error, format_event, format_event_json, format_topic},
    },
    differ::watch,
    events::Event,
    provider::{FileProvider, Provider},
    router::Topics,
    schema::Config,
    tracing_config::{self, LogFormat},
};
use tokio::{sync::mpsc::Receiver, task::JoinHandle};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, error, info, span};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_format = LogFormat::from_env();
    let _guard = match &args.log_dir {
        Some(dir) => Some(tracing_config::init_with_file(log_format, dir)?),
        None => {
            tracing_config::init(log_format)?;
            None
        }
    };

    if let Err(e) = run(args).await {
        error!(error = %e, "confwatch stopped");
        eprintln!("{}", format_error(&e.to_string()));
        process::exit(1);
    }

    Ok(())
}

/// Runs the pipeline until Ctrl-C, then closes the provider and waits for
/// every printer to finish.
///
/// # Errors
/// Returns error if the provider cannot be started or closed.
async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let span_guard = span!(Level::INFO, "confwatch", file = %args.file.display()).entered();

    let mut provider = FileProvider::<Config>::start(args.provider_settings())?;
    let snapshots = provider.watch().ok_or("snapshot stream already taken")?;
    let events = watch(ReceiverStream::new(snapshots));

    let topics = args.topics();
    let mut routed = topics
        .iter()
        .fold(Topics::new(events), |builder, topic| builder.topic(topic.as_str()))
        .build();

    let mut handles = Vec::new();
    for topic in &topics {
        if let Some(events) = routed.take(topic.as_str()) {
            handles.push(print_topic(topic.clone(), events, args.format));
        }
    }
    handles.extend(routed.drain_remaining());

    info!(topics = ?topics, "Watching configuration");
    drop(span_guard);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    provider.close().await?;

    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}

fn print_topic(
    topic: String,
    mut events: Receiver<Event>,
    format: OutputFormat,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match format {
                OutputFormat::Pretty => {
                    println!("{} {}", format_topic(&topic), format_event(&event));
                }
                OutputFormat::Json => match format_event_json(&topic, &event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => error!(key = %event.key, error = %e, "Cannot serialize event"),
                },
            }
        }
    })
}
