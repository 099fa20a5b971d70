use tokio::{sync::mpsc::Receiver, task::JoinHandle};
use tracing::debug;

use super::{Filter, drain, split};
use crate::events::Event;

/// Builder for a chain of split stages, one per topic.
///
/// Topics claim events in registration order: each stage only sees what the
/// stages before it left over. A topic registered after a shorter topic that
/// covers it therefore receives nothing; register the longer topic first.
///
/// # Example
/// ```no_run
/// # async fn example(events: tokio::sync::mpsc::Receiver<confwatch::events::Event>) {
/// use confwatch::router::Topics;
///
/// let mut topics = Topics::new(events)
///     .topic("services.search")
///     .topic("bot")
///     .build();
///
/// let mut bot = topics.take("bot").unwrap();
/// let _search = topics.take("services.search").unwrap();
/// topics.drain_remaining();
///
/// while let Some(event) = bot.recv().await {
///     println!("{}", event.key);
/// }
/// # }
/// ```
pub struct Topics {
    events: Receiver<Event>,
    filters: Vec<Filter>,
}

impl Topics {
    /// Starts a topic tree over `events`.
    pub fn new(events: Receiver<Event>) -> Self {
        Self {
            events,
            filters: Vec::new(),
        }
    }

    /// Registers a topic.
    ///
    /// Registering a filter a second time has no effect, since the first
    /// registration already claims every event it matches.
    pub fn topic(mut self, filter: impl Into<Filter>) -> Self {
        let filter = filter.into();

        if self.filters.contains(&filter) {
            debug!(%filter, "Topic already registered");
        } else {
            self.filters.push(filter);
        }

        self
    }

    /// Spawns one split stage per topic and returns their outputs.
    pub fn build(self) -> RoutedTopics {
        let mut rest = self.events;
        let mut topics = Vec::with_capacity(self.filters.len());

        for filter in self.filters {
            let (matched, remainder) = split(rest, filter.clone());
            topics.push((filter, Some(matched)));
            rest = remainder;
        }

        debug!(topics = topics.len(), "Topic stages started");

        RoutedTopics {
            topics,
            rest: Some(rest),
        }
    }
}

/// The outputs of a built [`Topics`] chain.
///
/// Receivers are handed out once. Outputs that are never taken must be
/// drained with [`RoutedTopics::drain_remaining`] or dropped along with this
/// value.
pub struct RoutedTopics {
    topics: Vec<(Filter, Option<Receiver<Event>>)>,
    rest: Option<Receiver<Event>>,
}

impl RoutedTopics {
    /// Takes the stream of the topic registered with `filter`.
    ///
    /// Returns `None` if no such topic was registered or it was already taken.
    pub fn take(&mut self, filter: impl Into<Filter>) -> Option<Receiver<Event>> {
        let filter = filter.into();

        self.topics
            .iter_mut()
            .find(|(topic, _)| *topic == filter)
            .and_then(|(_, receiver)| receiver.take())
    }

    /// Takes the stream of events no topic claimed.
    pub fn take_rest(&mut self) -> Option<Receiver<Event>> {
        self.rest.take()
    }

    /// The registered topics, in claim order.
    pub fn filters(&self) -> impl Iterator<Item = &Filter> {
        self.topics.iter().map(|(filter, _)| filter)
    }

    /// Drains every stream that has not been taken yet.
    pub fn drain_remaining(self) -> Vec<JoinHandle<()>> {
        self.topics
            .into_iter()
            .filter_map(|(_, receiver)| receiver)
            .chain(self.rest)
            .map(drain)
            .collect()
    }
}
