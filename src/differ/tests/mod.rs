//! Unit tests for the snapshot differ.
//! No filesystem, timing, or external dependencies.

#![allow(clippy::unwrap_used)]

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use futures::stream;
use toml::{Table, Value};

use crate::{
    diff_record,
    differ::{Opaque, diff, watch},
    events::{self, ChangeKind, Event, EventKind},
};

#[derive(Debug, Clone, Default, PartialEq)]
struct Discord {
    token: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Bot {
    discord: Discord,
    prefix: String,
    commands: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Limits {
    weights: HashMap<String, i64>,
    ports: BTreeMap<u16, bool>,
    tags: HashSet<String>,
    retries: Option<u32>,
    big: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Snapshot {
    bot: Bot,
    limits: Limits,
    r#type: String,
    api_key: String,
    handle: Opaque<usize>,
}

diff_record!(Discord { token });
diff_record!(Bot {
    discord,
    prefix,
    commands
});
diff_record!(Limits {
    weights,
    ports,
    tags,
    retries,
    big
});
diff_record!(Snapshot {
    bot,
    limits,
    r#type,
    api_key => "api-key",
    handle,
});

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn string_value(value: &str) -> Value {
    Value::String(value.to_string())
}

fn only_event(events: Vec<Event>) -> Event {
    assert_eq!(events.len(), 1, "expected exactly one event, got {events:?}");
    events.into_iter().next().unwrap()
}

async fn collect(mut rx: tokio::sync::mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

mod scalars {
    use super::*;

    #[test]
    fn equal_snapshots_emit_nothing() {
        let snapshot = Snapshot {
            r#type: "postgres".to_string(),
            ..Snapshot::default()
        };

        assert!(diff(&snapshot, &snapshot.clone()).is_empty());
    }

    #[test]
    fn changed_scalar_emits_one_change() {
        let old = Snapshot::default();
        let mut new = old.clone();
        new.bot.discord.token = "secret".to_string();

        let event = only_event(diff(&old, &new));

        assert_eq!(event.key, "bot.discord.token");
        assert_eq!(event.kind(), EventKind::Change);
        assert_eq!(event.value(), Some(&string_value("secret")));
    }

    #[test]
    fn raw_identifiers_are_stripped() {
        let old = Snapshot::default();
        let new = Snapshot {
            r#type: "mysql".to_string(),
            ..Snapshot::default()
        };

        assert_eq!(only_event(diff(&old, &new)).key, "type");
    }

    #[test]
    fn renamed_fields_use_their_published_name() {
        let old = Snapshot::default();
        let new = Snapshot {
            api_key: "abc".to_string(),
            ..Snapshot::default()
        };

        assert_eq!(only_event(diff(&old, &new)).key, "api-key");
    }

    #[test]
    fn integers_beyond_i64_are_reported_as_strings() {
        let old = Snapshot::default();
        let mut new = old.clone();
        new.limits.big = u64::MAX;

        let event = only_event(diff(&old, &new));

        assert_eq!(event.key, "limits.big");
        assert_eq!(event.value(), Some(&string_value("18446744073709551615")));
    }

    #[test]
    fn wide_integers_fit_in_i64_when_possible() {
        let event = only_event(diff(&0i128, &-5i128));
        assert_eq!(event.value(), Some(&Value::Integer(-5)));

        let event = only_event(diff(&0u128, &u128::MAX));
        assert_eq!(event.value(), Some(&string_value(&u128::MAX.to_string())));
    }

    #[test]
    fn opaque_fields_never_differ() {
        let old = Snapshot::default();
        let new = Snapshot {
            handle: Opaque(42),
            ..Snapshot::default()
        };

        assert_eq!(old, new);
        assert!(diff(&old, &new).is_empty());
    }

    #[test]
    fn one_event_per_changed_field() {
        let old = Snapshot::default();
        let mut new = old.clone();
        new.bot.prefix = "!".to_string();
        new.bot.discord.token = "t".to_string();
        new.r#type = "sqlite".to_string();

        let keys: Vec<String> = diff(&old, &new).into_iter().map(|e| e.key).collect();

        assert_eq!(keys, ["bot.discord.token", "bot.prefix", "type"]);
    }
}

mod wrappers {
    use super::*;

    #[test]
    fn absent_optional_stops_comparison() {
        let old = Limits::default();
        let new = Limits {
            retries: Some(3),
            ..Limits::default()
        };

        assert!(diff(&old, &new).is_empty());
        assert!(diff(&new, &old).is_empty());
    }

    #[test]
    fn present_optionals_are_compared() {
        let old = Limits {
            retries: Some(3),
            ..Limits::default()
        };
        let new = Limits {
            retries: Some(5),
            ..Limits::default()
        };

        let event = only_event(diff(&old, &new));

        assert_eq!(event.key, "retries");
        assert_eq!(event.value(), Some(&Value::Integer(5)));
    }

    #[test]
    fn shared_pointers_are_dereferenced() {
        let old = Arc::new(Discord::default());
        let new = Arc::new(Discord {
            token: "t".to_string(),
        });

        let event = only_event(diff(&old, &new));

        assert_eq!(event.key, "token");
        assert!(diff(&old, &old.clone()).is_empty());
    }
}

mod sequences {
    use super::*;

    #[test]
    fn additions_and_removals_emit_change() {
        let old = Bot {
            commands: strings(&["a", "b"]),
            ..Bot::default()
        };
        let new = Bot {
            commands: strings(&["b", "c"]),
            ..Bot::default()
        };

        let event = only_event(diff(&old, &new));
        let slice = event.as_slice().unwrap();

        assert_eq!(event.key, "commands");
        assert_eq!(slice.kind, ChangeKind::Change);
        assert_eq!(slice.additions, [string_value("c")]);
        assert_eq!(slice.removals, [string_value("a")]);
    }

    #[test]
    fn only_additions_emit_add() {
        let old = Bot {
            commands: strings(&["a"]),
            ..Bot::default()
        };
        let new = Bot {
            commands: strings(&["a", "b", "c"]),
            ..Bot::default()
        };

        let event = only_event(diff(&old, &new));
        let slice = event.as_slice().unwrap();

        assert_eq!(slice.kind, ChangeKind::Add);
        assert_eq!(slice.additions.len(), 2);
        assert!(slice.additions.contains(&string_value("b")));
        assert!(slice.additions.contains(&string_value("c")));
        assert!(slice.removals.is_empty());
    }

    #[test]
    fn only_removals_emit_remove() {
        let old = Bot {
            commands: strings(&["a", "b"]),
            ..Bot::default()
        };
        let new = Bot {
            commands: strings(&["b"]),
            ..Bot::default()
        };

        let slice = only_event(diff(&old, &new)).as_slice().cloned().unwrap();

        assert_eq!(slice.kind, ChangeKind::Remove);
        assert_eq!(slice.removals, [string_value("a")]);
        assert!(slice.additions.is_empty());
    }

    #[test]
    fn reordering_is_invisible() {
        let old = Bot {
            commands: strings(&["a", "b"]),
            ..Bot::default()
        };
        let new = Bot {
            commands: strings(&["b", "a"]),
            ..Bot::default()
        };

        assert_ne!(old, new);
        assert!(diff(&old, &new).is_empty());
    }

    #[test]
    fn duplicates_are_collapsed() {
        let old = Bot::default();
        let new = Bot {
            commands: strings(&["a", "a", "b"]),
            ..Bot::default()
        };

        let slice = only_event(diff(&old, &new)).as_slice().cloned().unwrap();

        assert_eq!(slice.additions, [string_value("a"), string_value("b")]);
    }

    #[test]
    fn absent_elements_are_encoded() {
        let old = vec![Some(1), Some(2)];
        let new = vec![Some(2), None];

        let slice = only_event(diff(&old, &new)).as_slice().cloned().unwrap();

        assert_eq!(slice.kind, ChangeKind::Change);
        assert_eq!(slice.additions, [events::absent()]);
        assert_eq!(slice.removals, [Value::Integer(1)]);
    }

    #[test]
    fn sets_are_compared_by_membership() {
        let old = Limits {
            tags: ["x", "y"].iter().map(|s| s.to_string()).collect(),
            ..Limits::default()
        };
        let new = Limits {
            tags: ["y", "z"].iter().map(|s| s.to_string()).collect(),
            ..Limits::default()
        };

        let event = only_event(diff(&old, &new));
        let slice = event.as_slice().unwrap();

        assert_eq!(event.key, "tags");
        assert_eq!(slice.kind, ChangeKind::Change);
        assert_eq!(slice.additions, [string_value("z")]);
        assert_eq!(slice.removals, [string_value("x")]);
    }
}

mod mappings {
    use super::*;

    fn weights(entries: &[(&str, i64)]) -> HashMap<String, i64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn table(entries: &[(&str, i64)]) -> Table {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::Integer(*v)))
            .collect()
    }

    #[test]
    fn partitions_additions_changes_and_removals() {
        let old = Limits {
            weights: weights(&[("k1", 1), ("k2", 2)]),
            ..Limits::default()
        };
        let new = Limits {
            weights: weights(&[("k2", 3), ("k3", 4)]),
            ..Limits::default()
        };

        let event = only_event(diff(&old, &new));
        let map = event.as_map().unwrap();

        assert_eq!(event.key, "weights");
        assert_eq!(map.kind, ChangeKind::Change);
        assert_eq!(map.additions, table(&[("k3", 4)]));
        assert_eq!(map.changes, table(&[("k2", 3)]));
        assert_eq!(map.removals, table(&[("k1", 1)]));
    }

    #[test]
    fn only_additions_emit_add() {
        let old = Limits::default();
        let new = Limits {
            weights: weights(&[("k1", 1)]),
            ..Limits::default()
        };

        let map = only_event(diff(&old, &new)).as_map().cloned().unwrap();

        assert_eq!(map.kind, ChangeKind::Add);
        assert_eq!(map.additions, table(&[("k1", 1)]));
        assert!(map.changes.is_empty());
        assert!(map.removals.is_empty());
    }

    #[test]
    fn only_removals_emit_remove() {
        let old = Limits {
            weights: weights(&[("k1", 1), ("k2", 2)]),
            ..Limits::default()
        };
        let new = Limits {
            weights: weights(&[("k2", 2)]),
            ..Limits::default()
        };

        let map = only_event(diff(&old, &new)).as_map().cloned().unwrap();

        assert_eq!(map.kind, ChangeKind::Remove);
        assert_eq!(map.removals, table(&[("k1", 1)]));
    }

    #[test]
    fn swapped_keys_are_not_a_rename() {
        let old = Limits {
            weights: weights(&[("old", 1)]),
            ..Limits::default()
        };
        let new = Limits {
            weights: weights(&[("new", 1)]),
            ..Limits::default()
        };

        let map = only_event(diff(&old, &new)).as_map().cloned().unwrap();

        assert_eq!(map.kind, ChangeKind::Change);
        assert_eq!(map.additions, table(&[("new", 1)]));
        assert_eq!(map.removals, table(&[("old", 1)]));
        assert!(map.changes.is_empty());
    }

    #[test]
    fn only_changes_emit_change() {
        let old = Limits {
            weights: weights(&[("k", 1)]),
            ..Limits::default()
        };
        let new = Limits {
            weights: weights(&[("k", 2)]),
            ..Limits::default()
        };

        let map = only_event(diff(&old, &new)).as_map().cloned().unwrap();

        assert_eq!(map.kind, ChangeKind::Change);
        assert_eq!(map.changes, table(&[("k", 2)]));
    }

    #[test]
    fn entry_becoming_absent_is_a_change() {
        let old = BTreeMap::from([("k".to_string(), Some(1))]);
        let new = BTreeMap::from([("k".to_string(), None)]);

        let map = only_event(diff(&old, &new)).as_map().cloned().unwrap();

        assert_eq!(map.kind, ChangeKind::Change);
        assert_eq!(map.changes.get("k"), Some(&events::absent()));
        assert!(map.additions.is_empty());
        assert!(map.removals.is_empty());
    }

    #[test]
    fn large_values_survive_in_entries() {
        let old: BTreeMap<String, u64> = BTreeMap::new();
        let new = BTreeMap::from([("k".to_string(), u64::MAX)]);

        let map = only_event(diff(&old, &new)).as_map().cloned().unwrap();

        assert_eq!(map.kind, ChangeKind::Add);
        assert_eq!(
            map.additions.get("k"),
            Some(&string_value("18446744073709551615"))
        );
    }

    #[test]
    fn integer_keys_are_stringified() {
        let old = Limits::default();
        let new = Limits {
            ports: [(8080, true)].into_iter().collect(),
            ..Limits::default()
        };

        let map = only_event(diff(&old, &new)).as_map().cloned().unwrap();

        assert_eq!(map.additions.get("8080"), Some(&Value::Boolean(true)));
    }
}

mod streaming {
    use super::*;

    #[tokio::test]
    async fn first_snapshot_is_reported_as_baseline() {
        let snapshot = Snapshot {
            bot: Bot {
                prefix: "!".to_string(),
                commands: strings(&["play"]),
                ..Bot::default()
            },
            ..Snapshot::default()
        };

        let events = collect(watch(stream::iter(vec![snapshot]))).await;
        let keys: Vec<&str> = events.iter().map(|e| e.key.as_str()).collect();

        assert_eq!(keys, ["bot.prefix", "bot.commands"]);
        assert_eq!(events[1].as_slice().unwrap().kind, ChangeKind::Add);
    }

    #[tokio::test]
    async fn repeated_snapshot_emits_nothing_more() {
        let snapshot = Snapshot {
            r#type: "postgres".to_string(),
            ..Snapshot::default()
        };

        let events = collect(watch(stream::iter(vec![
            snapshot.clone(),
            snapshot.clone(),
        ])))
        .await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, "type");
    }

    #[tokio::test]
    async fn each_snapshot_is_compared_with_the_previous_one() {
        let first = Snapshot {
            r#type: "a".to_string(),
            ..Snapshot::default()
        };
        let second = Snapshot {
            r#type: "b".to_string(),
            ..Snapshot::default()
        };

        let events = collect(watch(stream::iter(vec![
            first.clone(),
            first,
            second.clone(),
            second,
        ])))
        .await;
        let values: Vec<String> = events.iter().filter_map(Event::as_string).collect();

        assert_eq!(values, ["a", "b"]);
    }

    #[tokio::test]
    async fn output_closes_with_input() {
        let (tx, rx) = tokio::sync::mpsc::channel::<Snapshot>(1);
        let mut events = watch(tokio_stream::wrappers::ReceiverStream::new(rx));

        tx.send(Snapshot {
            api_key: "k".to_string(),
            ..Snapshot::default()
        })
        .await
        .unwrap();
        assert_eq!(events.recv().await.unwrap().key, "api-key");

        drop(tx);
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn shared_snapshots_can_be_watched() {
        let snapshot = Arc::new(Discord {
            token: "t".to_string(),
        });

        let events = collect(watch(stream::iter(vec![snapshot.clone(), snapshot]))).await;

        assert_eq!(events.len(), 1);
    }
}
