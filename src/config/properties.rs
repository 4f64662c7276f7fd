use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::forms::error::FormError;

// ============================================================================
// Configuration entries shared by every form configuration source
// ============================================================================

/// Which list a configuration key carries for its field id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldProperty {
    /// Ordered alias names / patterns
    Fields,
    /// Ordered candidate values
    Values,
}

impl FieldProperty {
    fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("fields") {
            Some(FieldProperty::Fields)
        } else if name.eq_ignore_ascii_case("values") {
            Some(FieldProperty::Values)
        } else {
            None
        }
    }
}

/// One `<id>.<property> = a, b, c` line, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub field_id: String,
    pub property: FieldProperty,
    pub items: Vec<String>,
}

impl ConfigEntry {
    pub fn fields(field_id: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            field_id: field_id.into(),
            property: FieldProperty::Fields,
            items,
        }
    }

    pub fn values(field_id: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            field_id: field_id.into(),
            property: FieldProperty::Values,
            items,
        }
    }

    /// Split a dotted key at its last dot into field id and property.
    pub fn from_key(key: &str, items: Vec<String>) -> Option<Self> {
        let (field_id, property) = key.rsplit_once('.')?;
        if field_id.is_empty() {
            return None;
        }
        let property = FieldProperty::parse(property)?;
        Some(Self {
            field_id: field_id.to_string(),
            property,
            items,
        })
    }
}

// ============================================================================
// Properties-file parsing
// ============================================================================

/// Parse properties-file text into configuration entries.
///
/// Keys that do not name a `fields` or `values` property are skipped.
pub fn parse_properties(content: &str) -> Vec<ConfigEntry> {
    let mut entries = Vec::new();

    for line in logical_lines(content) {
        let Some((key, raw_value)) = split_key_value(&line) else {
            continue;
        };
        let items = split_list(raw_value);
        match ConfigEntry::from_key(key, items) {
            Some(entry) => entries.push(entry),
            None => debug!("Ignoring form configuration key '{}'", key),
        }
    }

    entries
}

/// Read and parse a properties file.
pub fn load_properties(path: &Path) -> Result<Vec<ConfigEntry>, FormError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| FormError::ConfigurationUnavailable {
            path: path.display().to_string(),
            source: e,
        })?;
    Ok(parse_properties(&content))
}

/// Join continuation lines and drop comments and blanks.
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();

    for raw in content.lines() {
        let trimmed = if pending.is_empty() {
            raw.trim()
        } else {
            raw.trim_start()
        };

        if pending.is_empty() && (trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!')) {
            continue;
        }

        if ends_with_continuation(trimmed) {
            pending.push_str(&trimmed[..trimmed.len() - 1]);
            continue;
        }

        pending.push_str(trimmed);
        lines.push(std::mem::take(&mut pending));
    }

    if !pending.is_empty() {
        lines.push(pending);
    }

    lines
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let sep = line.find(|c: char| c == '=' || c == ':' || c.is_whitespace())?;
    let key = line[..sep].trim();
    let mut rest = line[sep..].trim_start();
    if rest.starts_with('=') || rest.starts_with(':') {
        rest = rest[1..].trim_start();
    }
    if key.is_empty() {
        return None;
    }
    Some((key, rest))
}

/// Split a comma-separated list, honouring `\,` as a literal comma.
fn split_list(raw: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
