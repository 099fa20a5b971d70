//! Formatting utilities for CLI output.
//!
//! Renders routed events as colored human-readable lines or as JSON.

use toml::{Table, Value};

use crate::events::{ChangeKind, Event, Payload};

/// ANSI color codes for terminal output
pub struct Colors;

impl Colors {
    /// Reset all formatting
    pub const RESET: &'static str = "\x1b[0m";
    /// Bold text
    pub const BOLD: &'static str = "\x1b[1m";

    /// Red color
    pub const RED: &'static str = "\x1b[31m";
    /// Green color
    pub const GREEN: &'static str = "\x1b[32m";
    /// Yellow color
    pub const YELLOW: &'static str = "\x1b[33m";
    /// Cyan color
    pub const CYAN: &'static str = "\x1b[36m";
}

/// Formats topic names with styling
pub fn format_topic(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::CYAN, text, Colors::RESET)
}

/// Formats error messages with red styling
pub fn format_error(text: &str) -> String {
    format!("{}{}{}{}", Colors::BOLD, Colors::RED, text, Colors::RESET)
}

/// Formats a TOML value for human-readable CLI output.
///
/// Complex types like arrays and tables show their size rather than full
/// contents.
///
/// # Examples
///
/// ```
/// use confwatch::cli::formatting::format_toml_value;
///
/// let value = toml::Value::String("hello".to_string());
/// assert_eq!(format_toml_value(&value), "\"hello\"");
///
/// let value = toml::Value::Integer(42);
/// assert_eq!(format_toml_value(&value), "42");
/// ```
pub fn format_toml_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(arr) => format!("[{}]", arr.len()),
        Value::Table(table) => format!("{{{}}}", table.len()),
    }
}

fn format_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> String {
    values
        .into_iter()
        .map(format_toml_value)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_entries(table: &Table) -> String {
    table
        .iter()
        .map(|(key, value)| format!("{key}={}", format_toml_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn kind_label(kind: ChangeKind) -> String {
    match kind {
        ChangeKind::Change => format!("{}change{}", Colors::YELLOW, Colors::RESET),
        ChangeKind::Add => format!("{}add{}", Colors::GREEN, Colors::RESET),
        ChangeKind::Remove => format!("{}remove{}", Colors::RED, Colors::RESET),
    }
}

/// Formats an event as a single human-readable line.
///
/// Scalar changes show the new value; collection deltas list their
/// additions (`+`), changes (`~`) and removals (`-`).
pub fn format_event(event: &Event) -> String {
    let details = match &event.payload {
        Payload::Change(value) => format!("-> {}", format_toml_value(value)),
        Payload::Slice(slice) => {
            let mut parts = Vec::new();
            if !slice.additions.is_empty() {
                parts.push(format!("+[{}]", format_values(&slice.additions)));
            }
            if !slice.removals.is_empty() {
                parts.push(format!("-[{}]", format_values(&slice.removals)));
            }
            format!("{} {}", kind_label(slice.kind), parts.join(" "))
        }
        Payload::Map(map) => {
            let mut parts = Vec::new();
            if !map.additions.is_empty() {
                parts.push(format!("+{{{}}}", format_entries(&map.additions)));
            }
            if !map.changes.is_empty() {
                parts.push(format!("~{{{}}}", format_entries(&map.changes)));
            }
            if !map.removals.is_empty() {
                parts.push(format!("-{{{}}}", format_entries(&map.removals)));
            }
            format!("{} {}", kind_label(map.kind), parts.join(" "))
        }
    };

    format!("{}{}{} {}", Colors::BOLD, event.key, Colors::RESET, details)
}

/// Formats an event as one JSON object, tagged with the topic that claimed it.
///
/// # Errors
/// Returns error if the event cannot be serialized.
pub fn format_event_json(topic: &str, event: &Event) -> Result<String, serde_json::Error> {
    let mut object = serde_json::to_value(event)?;
    if let serde_json::Value::Object(map) = &mut object {
        map.insert(
            "topic".to_string(),
            serde_json::Value::String(topic.to_string()),
        );
    }

    serde_json::to_string(&object)
}
