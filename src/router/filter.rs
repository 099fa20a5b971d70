use std::fmt;

use crate::key::{self, KeyPath, SEPARATOR};

/// A key prefix selecting the events of one topic.
///
/// A key matches when every filter segment equals the key segment at the
/// same position. Keys shorter than the filter never match, and the empty
/// filter matches every key.
///
/// # Examples
/// * `"bot.prefix"` matches `bot`
/// * `"services.search.location"` matches `services.search`
/// * `"services"` does not match `services.search`
/// * `"botany.kind"` does not match `bot`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    segments: Vec<String>,
}

impl Filter {
    /// Creates a filter from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a dotted topic such as `services.search`.
    pub fn parse(topic: &str) -> Self {
        Self::new(key::segments(topic))
    }

    /// The segments of this filter.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether `key` lies below this filter.
    pub fn matches(&self, key: &str) -> bool {
        let mut key_segments = key::segments(key);

        self.segments
            .iter()
            .all(|want| key_segments.next() == Some(want.as_str()))
    }

    /// Whether `path` lies below this filter.
    pub fn matches_path(&self, path: &KeyPath) -> bool {
        path.starts_with(self.segments.as_slice())
    }

    /// Returns a longer filter with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());

        Self { segments }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(SEPARATOR))
    }
}

impl From<&str> for Filter {
    fn from(topic: &str) -> Self {
        Self::parse(topic)
    }
}

impl From<String> for Filter {
    fn from(topic: String) -> Self {
        Self::parse(&topic)
    }
}

impl From<&[&str]> for Filter {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Filter {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl From<Vec<String>> for Filter {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<&Filter> for Filter {
    fn from(filter: &Filter) -> Self {
        filter.clone()
    }
}
