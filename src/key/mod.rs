//! Hierarchical key paths.
//!
//! Every event is addressed by a dot-separated path built from the field
//! names traversed from the snapshot root. All joining and splitting of
//! those paths goes through this module so producers and routers agree on
//! one separator.

use std::fmt;


/// Separator placed between the segments of an event key.
pub const SEPARATOR: &str = ".";

/// Splits a rendered key into its segments.
///
/// An empty key has no segments.
///
/// # Examples
/// * `"bot.discord.token"` yields `["bot", "discord", "token"]`
/// * `""` yields nothing
pub fn segments(key: &str) -> impl Iterator<Item = &str> {
    key.split(SEPARATOR).filter(|segment| !segment.is_empty())
}

/// An owned path from the snapshot root to a field.
///
/// Paths are built while descending into a snapshot and rendered with
/// [`SEPARATOR`] once an event is emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// The empty path, addressing the snapshot root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a rendered key back into a path.
    pub fn parse(key: &str) -> Self {
        Self {
            segments: segments(key).map(str::to_string).collect(),
        }
    }

    /// Returns a new path with `name` appended, lower-cased.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_lowercase());

        Self { segments }
    }

    /// The segments of this path, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this path addresses the snapshot root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `prefix` matches the leading segments of this path.
    pub fn starts_with<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
        prefix.len() <= self.segments.len()
            && prefix
                .iter()
                .zip(&self.segments)
                .all(|(want, have)| want.as_ref() == have)
    }

    /// Renders the path as a single key.
    pub fn join(&self) -> String {
        self.segments.join(SEPARATOR)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join())
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        Self::parse(key)
    }
}
