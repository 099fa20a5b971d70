use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    hash::{BuildHasher, Hash},
};

use serde::Serialize;
use toml::{Table, Value};

use super::{
    Diff,
    value::{key_name, to_value},
};
use crate::{
    events::{ChangeKind, Event, MapEvent, SliceEvent},
    key::KeyPath,
};

impl<T: PartialEq + Serialize> Diff for Vec<T> {
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        sequence_changes(self.iter(), new.iter(), key, events);
    }
}

impl<T: PartialEq + Serialize> Diff for VecDeque<T> {
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        sequence_changes(self.iter(), new.iter(), key, events);
    }
}

impl<T: PartialEq + Serialize, const N: usize> Diff for [T; N] {
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        sequence_changes(self.iter(), new.iter(), key, events);
    }
}

impl<T: PartialEq + Serialize> Diff for [T] {
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        sequence_changes(self.iter(), new.iter(), key, events);
    }
}

impl<T, S> Diff for HashSet<T, S>
where
    T: Eq + Hash + Serialize,
    S: BuildHasher,
{
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        sequence_changes(self.iter(), new.iter(), key, events);
    }
}

impl<T: Ord + Serialize> Diff for BTreeSet<T> {
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        sequence_changes(self.iter(), new.iter(), key, events);
    }
}

impl<K, V, S> Diff for HashMap<K, V, S>
where
    K: Eq + Hash + Serialize,
    V: PartialEq + Serialize,
    S: BuildHasher,
{
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        if self == new {
            return;
        }

        mapping_changes(
            self.iter(),
            new.iter(),
            |k| self.contains_key(k),
            |k| new.get(k),
            key,
            events,
        );
    }
}

impl<K, V> Diff for BTreeMap<K, V>
where
    K: Ord + Serialize,
    V: PartialEq + Serialize,
{
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        if self == new {
            return;
        }

        mapping_changes(
            self.iter(),
            new.iter(),
            |k| self.contains_key(k),
            |k| new.get(k),
            key,
            events,
        );
    }
}

/// Collects the distinct values of `items` that `other` does not contain.
fn missing_from<'a, T: PartialEq>(items: &[&'a T], other: &[&'a T]) -> Vec<&'a T> {
    let mut missing: Vec<&T> = Vec::new();

    for &item in items {
        if !other.contains(&item) && !missing.contains(&item) {
            missing.push(item);
        }
    }

    missing
}

/// Compares two sequences as sets of values and emits one slice event.
///
/// Position is ignored: reordering, or repeating an element already present,
/// produces nothing.
fn sequence_changes<'a, T, I>(old: I, new: I, key: &KeyPath, events: &mut Vec<Event>)
where
    T: PartialEq + Serialize + 'a,
    I: Iterator<Item = &'a T>,
{
    let old: Vec<&T> = old.collect();
    let new: Vec<&T> = new.collect();

    if old == new {
        return;
    }

    let additions: Vec<Value> = missing_from(&new, &old)
        .into_iter()
        .filter_map(to_value)
        .collect();
    let removals: Vec<Value> = missing_from(&old, &new)
        .into_iter()
        .filter_map(to_value)
        .collect();

    let kind = match (additions.is_empty(), removals.is_empty()) {
        (false, false) => ChangeKind::Change,
        (false, true) => ChangeKind::Add,
        (true, false) => ChangeKind::Remove,
        (true, true) => return,
    };

    events.push(Event::slice(
        key.join(),
        SliceEvent {
            kind,
            additions,
            removals,
        },
    ));
}

/// Partitions two mappings into added, changed and removed entries and
/// emits one map event.
fn mapping_changes<'a, K, V, I>(
    old: I,
    new: I,
    in_old: impl Fn(&K) -> bool,
    in_new: impl Fn(&K) -> Option<&'a V>,
    key: &KeyPath,
    events: &mut Vec<Event>,
) where
    K: Serialize + 'a,
    V: PartialEq + Serialize + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let mut additions = Table::new();
    let mut changes = Table::new();
    let mut removals = Table::new();

    for (k, old_value) in old {
        let Some(name) = key_name(k) else {
            continue;
        };

        match in_new(k) {
            None => {
                if let Some(value) = to_value(old_value) {
                    removals.insert(name, value);
                }
            }
            Some(new_value) if new_value != old_value => {
                if let Some(value) = to_value(new_value) {
                    changes.insert(name, value);
                }
            }
            Some(_) => {}
        }
    }

    for (k, new_value) in new {
        if in_old(k) {
            continue;
        }

        let (Some(name), Some(value)) = (key_name(k), to_value(new_value)) else {
            continue;
        };

        additions.insert(name, value);
    }

    let kind = if !changes.is_empty() || (!additions.is_empty() && !removals.is_empty()) {
        ChangeKind::Change
    } else if !additions.is_empty() {
        ChangeKind::Add
    } else if !removals.is_empty() {
        ChangeKind::Remove
    } else {
        return;
    };

    events.push(Event::map(
        key.join(),
        MapEvent {
            kind,
            additions,
            changes,
            removals,
        },
    ));
}
