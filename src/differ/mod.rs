//! Structural snapshot differ.
//!
//! Compares consecutive configuration snapshots and emits one [`Event`] per
//! detected difference. Snapshot types opt in through the [`Diff`] trait:
//! scalars, wrappers, sequences and mappings are covered here, records use
//! the [`diff_record!`](crate::diff_record) macro.

mod collections;
mod impls;
mod value;

#[cfg(test)]
mod tests;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, trace};

use crate::{
    events::{self, Event},
    key::KeyPath,
};

pub use impls::Opaque;

/// Structural comparison of two values of the same type.
///
/// Implementations push one event per difference into `events`, addressed
/// below `key`. Equal values must emit nothing. Implementations never fail:
/// anything that cannot be compared is skipped.
pub trait Diff: PartialEq {
    /// Compares `self` (the old value) against `new`.
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>);
}

/// Compares two snapshots and returns every difference, rooted at the empty key.
pub fn diff<S: Diff + ?Sized>(old: &S, new: &S) -> Vec<Event> {
    let mut events = Vec::new();
    old.diff(new, &KeyPath::root(), &mut events);
    events
}

/// Turns a stream of snapshots into a stream of change events.
///
/// The first snapshot is compared against `S::default()`, so it produces the
/// baseline events for every populated field. Every later snapshot is
/// compared against the one before it. The returned receiver closes once
/// `snapshots` ends.
///
/// The receiver must be drained continuously; the differ waits for each
/// event to be taken before producing the next one.
pub fn watch<S, St>(snapshots: St) -> Receiver<Event>
where
    S: Diff + Default + Send + 'static,
    St: Stream<Item = S> + Send + 'static,
{
    let (tx, rx) = events::handoff();

    tokio::spawn(async move {
        let mut snapshots = Box::pin(snapshots);
        let mut last = S::default();
        debug!("Snapshot differ started");

        while let Some(snapshot) = snapshots.next().await {
            let changes = diff(&last, &snapshot);
            last = snapshot;
            trace!(count = changes.len(), "Snapshot compared");

            for event in changes {
                if let Err(e) = tx.send(event).await {
                    trace!(key = %e.0.key, "Event receiver dropped, discarding event");
                }
            }
        }

        debug!("Snapshot stream closed, stopping differ");
    });

    rx
}

#[doc(hidden)]
pub fn field_name(ident: &str) -> &str {
    ident.trim_start_matches("r#")
}

/// Implements [`Diff`] for a record by comparing the listed fields.
///
/// Each field is compared under its lower-cased name appended to the
/// record's key. A field can be published under another name with
/// `field => "name"`. Fields left out of the list are never compared.
///
/// # Example
/// ```
/// use confwatch::diff_record;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Discord {
///     token: String,
/// }
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Bot {
///     discord: Discord,
///     prefix: String,
///     commands: Vec<String>,
/// }
///
/// diff_record!(Discord { token });
/// diff_record!(Bot { discord, prefix, commands });
///
/// let old = Bot::default();
/// let new = Bot { prefix: "!".to_string(), ..Bot::default() };
///
/// let events = confwatch::differ::diff(&old, &new);
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].key, "prefix");
/// ```
#[macro_export]
macro_rules! diff_record {
    ($ty:ty { $($field:ident $(=> $name:literal)?),* $(,)? }) => {
        impl $crate::differ::Diff for $ty {
            fn diff(
                &self,
                new: &Self,
                key: &$crate::key::KeyPath,
                events: &mut ::std::vec::Vec<$crate::events::Event>,
            ) {
                if self == new {
                    return;
                }

                $(
                    $crate::differ::Diff::diff(
                        &self.$field,
                        &new.$field,
                        &key.child($crate::__diff_field_name!($field $(, $name)?)),
                        events,
                    );
                )*
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __diff_field_name {
    ($field:ident) => {
        $crate::differ::field_name(stringify!($field))
    };
    ($field:ident, $name:literal) => {
        $name
    };
}
