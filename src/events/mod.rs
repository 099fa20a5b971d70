//! Change events produced by the differ.
//!
//! An [`Event`] names the changed field by its dotted key and carries a
//! payload describing the change: a new scalar value, or the added, removed
//! and altered elements of a sequence or mapping.

use serde::Serialize;
use tokio::sync::mpsc::{self, Receiver, Sender};
use toml::{Table, Value};

use crate::key;


/// Capacity of the channels connecting pipeline stages.
///
/// Each edge buffers at most one event: a send completes immediately while
/// the slot is empty, and otherwise waits until the consumer has taken the
/// previous event. A stalled consumer therefore holds back everything
/// upstream of it after one event.
pub const HANDOFF_CAPACITY: usize = 1;

/// Payload encoding of an absent value (`None` or unit) inside a sequence or
/// mapping delta: an empty table.
pub fn absent() -> Value {
    Value::Table(Table::new())
}

/// Creates the channel connecting one pipeline stage to the next.
pub(crate) fn handoff() -> (Sender<Event>, Receiver<Event>) {
    mpsc::channel(HANDOFF_CAPACITY)
}

/// What happened to a field or to the elements of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// The value was replaced, or elements were both added and removed.
    Change,
    /// Elements were only added.
    Add,
    /// Elements were only removed.
    Remove,
}

/// The broad category of an event, derived from its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A scalar field changed.
    Change,
    /// An ordered sequence gained or lost elements.
    Slice,
    /// A mapping gained, lost, or altered entries.
    Map,
}

/// Delta of an ordered sequence, compared as a set of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceEvent {
    /// Classification of the delta.
    pub kind: ChangeKind,
    /// Values present in the new sequence but not in the old one.
    pub additions: Vec<Value>,
    /// Values present in the old sequence but not in the new one.
    pub removals: Vec<Value>,
}

/// Delta of a key-value mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEvent {
    /// Classification of the delta.
    pub kind: ChangeKind,
    /// Entries whose key only exists in the new mapping.
    pub additions: Table,
    /// Entries present on both sides with a different value, holding the new value.
    pub changes: Table,
    /// Entries whose key only exists in the old mapping, holding the old value.
    pub removals: Table,
}

/// Payload of an [`Event`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Payload {
    /// New value of a scalar field.
    Change(Value),
    /// Sequence delta.
    Slice(SliceEvent),
    /// Mapping delta.
    Map(MapEvent),
}

/// A single detected difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Dotted path of the changed field (e.g. `bot.discord.token`).
    pub key: String,
    /// What changed.
    #[serde(flatten)]
    pub payload: Payload,
}

/// Errors returned when reading an event payload as a concrete type.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The payload could not be deserialized into the requested type.
    #[error("Type mismatch at {key}: Expected {expected_type}, got {actual_value:?}")]
    TypeMismatch {
        /// Key of the event.
        key: String,
        /// The expected type name.
        expected_type: &'static str,
        /// The value that was carried by the event.
        actual_value: Value,
    },

    /// The event describes a collection delta rather than a new scalar value.
    #[error("event at {key} is a {kind:?} event, not a scalar change")]
    NotScalar {
        /// Key of the event.
        key: String,
        /// Kind of the event.
        kind: EventKind,
    },
}

impl Event {
    /// Creates a scalar change event.
    pub fn change(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            payload: Payload::Change(value),
        }
    }

    /// Creates a sequence event.
    pub fn slice(key: impl Into<String>, slice: SliceEvent) -> Self {
        Self {
            key: key.into(),
            payload: Payload::Slice(slice),
        }
    }

    /// Creates a mapping event.
    pub fn map(key: impl Into<String>, map: MapEvent) -> Self {
        Self {
            key: key.into(),
            payload: Payload::Map(map),
        }
    }

    /// The category of this event.
    pub fn kind(&self) -> EventKind {
        match self.payload {
            Payload::Change(_) => EventKind::Change,
            Payload::Slice(_) => EventKind::Slice,
            Payload::Map(_) => EventKind::Map,
        }
    }

    /// The segments of this event's key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        key::segments(&self.key)
    }

    /// The new value of a scalar change, if this is one.
    pub fn value(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Change(value) => Some(value),
            _ => None,
        }
    }

    /// The sequence delta, if this is a slice event.
    pub fn as_slice(&self) -> Option<&SliceEvent> {
        match &self.payload {
            Payload::Slice(slice) => Some(slice),
            _ => None,
        }
    }

    /// The mapping delta, if this is a map event.
    pub fn as_map(&self) -> Option<&MapEvent> {
        match &self.payload {
            Payload::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Extracts the new value of a scalar change as a specific type.
    ///
    /// # Errors
    ///
    /// Returns `EventError::NotScalar` for slice and map events, and
    /// `EventError::TypeMismatch` if the value cannot be deserialized into `T`.
    pub fn extract<T>(&self) -> Result<T, EventError>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = self.value().ok_or_else(|| EventError::NotScalar {
            key: self.key.clone(),
            kind: self.kind(),
        })?;

        let handle_err = |_e: toml::de::Error| -> EventError {
            EventError::TypeMismatch {
                key: self.key.clone(),
                expected_type: std::any::type_name::<T>(),
                actual_value: value.clone(),
            }
        };

        T::deserialize(value.clone()).map_err(handle_err)
    }

    /// Attempts to read the new value of a scalar change as a string.
    ///
    /// Returns `None` if this is not a scalar change or the value is not a string.
    pub fn as_string(&self) -> Option<String> {
        match self.value() {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    /// Reads the new value as a string with a fallback default.
    pub fn as_string_or(&self, default: &str) -> String {
        self.as_string().unwrap_or_else(|| default.to_string())
    }
}
