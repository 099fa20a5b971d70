use std::{
    fmt,
    marker::PhantomData,
    ops::{Deref, DerefMut},
    rc::Rc,
    sync::Arc,
};

use toml::Value;

use super::{Diff, value::to_value};
use crate::{events::Event, key::KeyPath};

macro_rules! scalar_diff {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Diff for $ty {
                fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
                    scalar_change(self, new, key, events);
                }
            }
        )*
    };
}

scalar_diff!(
    bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, str,
);

macro_rules! wide_integer_diff {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Diff for $ty {
                fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
                    if self == new {
                        return;
                    }

                    let value = i64::try_from(*new)
                        .map(Value::Integer)
                        .unwrap_or_else(|_| Value::String(new.to_string()));
                    events.push(Event::change(key.join(), value));
                }
            }
        )*
    };
}

wide_integer_diff!(i128, u128);

fn scalar_change<T>(old: &T, new: &T, key: &KeyPath, events: &mut Vec<Event>)
where
    T: PartialEq + serde::Serialize + ?Sized,
{
    if old == new {
        return;
    }

    if let Some(value) = to_value(new) {
        events.push(Event::change(key.join(), value));
    }
}

impl<T: Diff> Diff for Option<T> {
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        if let (Some(old), Some(new)) = (self, new) {
            old.diff(new, key, events);
        }
    }
}

impl<T: Diff + ?Sized> Diff for Box<T> {
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        (**self).diff(&**new, key, events);
    }
}

impl<T: Diff + ?Sized> Diff for Arc<T> {
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        if Arc::ptr_eq(self, new) {
            return;
        }

        (**self).diff(&**new, key, events);
    }
}

impl<T: Diff + ?Sized> Diff for Rc<T> {
    fn diff(&self, new: &Self, key: &KeyPath, events: &mut Vec<Event>) {
        if Rc::ptr_eq(self, new) {
            return;
        }

        (**self).diff(&**new, key, events);
    }
}

impl Diff for () {
    fn diff(&self, _new: &Self, _key: &KeyPath, _events: &mut Vec<Event>) {}
}

impl<T: ?Sized> Diff for PhantomData<T> {
    fn diff(&self, _new: &Self, _key: &KeyPath, _events: &mut Vec<Event>) {}
}

/// Wrapper for snapshot fields that cannot be compared.
///
/// Always equal to any other `Opaque<T>` and never produces events, which
/// lets records holding handles, callbacks or channels still derive
/// `PartialEq` and take part in diffing.
#[derive(Clone, Copy, Default)]
pub struct Opaque<T>(pub T);

impl<T> PartialEq for Opaque<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T> Diff for Opaque<T> {
    fn diff(&self, _new: &Self, _key: &KeyPath, _events: &mut Vec<Event>) {}
}

impl<T> Deref for Opaque<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Opaque<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> fmt::Debug for Opaque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Opaque(..)")
    }
}
