//! Event routing by key prefix.
//!
//! A split stage divides one event stream into the events below a [`Filter`]
//! and everything else. Stages chain: the remainder of one stage feeds the
//! next, and a matched stream can be split again with a longer filter to
//! drill into sub-topics.
//!
//! Every output must be drained, either by a real consumer or by [`drain`].
//! A stage waits for each event to be taken before reading the next one, so
//! an unread output stalls the whole pipeline above it.

mod filter;
mod topics;


use tokio::{
    sync::mpsc::{Receiver, Sender},
    task::JoinHandle,
};
use tracing::{debug, trace};

use crate::events::{self, Event};

pub use filter::Filter;
pub use topics::{RoutedTopics, Topics};

/// Splits `events` into the events matching `filter` and the rest.
///
/// Both outputs preserve the input order of the events routed to them and
/// close once `events` closes. Events routed to an output whose receiver was
/// dropped are discarded.
pub fn split(
    mut events: Receiver<Event>,
    filter: impl Into<Filter>,
) -> (Receiver<Event>, Receiver<Event>) {
    let filter = filter.into();
    let (matched_tx, matched_rx) = events::handoff();
    let (rest_tx, rest_rx) = events::handoff();

    tokio::spawn(async move {
        debug!(%filter, "Split stage started");

        while let Some(event) = events.recv().await {
            if filter.matches(&event.key) {
                forward(&matched_tx, event, &filter, "matched").await;
            } else {
                forward(&rest_tx, event, &filter, "rest").await;
            }
        }

        debug!(%filter, "Input closed, stopping split stage");
    });

    (matched_rx, rest_rx)
}

async fn forward(tx: &Sender<Event>, event: Event, filter: &Filter, output: &'static str) {
    trace!(key = %event.key, %filter, output, "Routing event");

    if let Err(e) = tx.send(event).await {
        trace!(key = %e.0.key, %filter, output, "Receiver dropped, discarding event");
    }
}

/// Reads and discards `events` until the stream closes.
///
/// Use this for outputs whose events are intentionally ignored so they do
/// not stall the stages feeding them.
pub fn drain(mut events: Receiver<Event>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut discarded = 0usize;

        while events.recv().await.is_some() {
            discarded += 1;
        }

        trace!(discarded, "Drained stream closed");
    })
}
