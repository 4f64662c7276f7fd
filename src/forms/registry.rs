use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::FormError;
use crate::config::crawl_config::FormsConfig;
use crate::config::properties::{ConfigEntry, FieldProperty};

// ============================================================================
// Field definitions
// ============================================================================

/// Configured logical identity for one or more form controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub id: String,
    pub alias_patterns: Vec<String>,
    pub values: Vec<String>,
}

/// An alias compiled once at build time, tagged with its owning field id.
///
/// `regex` is `None` when the alias is not a valid pattern; such aliases
/// still serve literal control lookup but never match in resolution.
#[derive(Debug, Clone)]
pub struct AliasPattern {
    pub alias: String,
    pub field_id: String,
    regex: Option<Regex>,
}

impl AliasPattern {
    fn compile(alias: &str, field_id: &str) -> Self {
        let built = RegexBuilder::new(&format!("^(?:{})$", alias))
            .case_insensitive(true)
            .build();
        let regex = match built {
            Ok(regex) => Some(regex),
            Err(e) => {
                let invalid = FormError::ConfigurationFormat {
                    context: format!("alias '{}' of field '{}'", alias, field_id),
                    message: e.to_string(),
                };
                warn!("{}", invalid);
                None
            }
        };
        Self {
            alias: alias.to_string(),
            field_id: field_id.to_string(),
            regex,
        }
    }

    /// Case-insensitive full match of `name` against this alias.
    pub fn full_match(&self, name: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(name))
    }

    /// Literal equality with the alias text, or a full pattern match.
    pub fn matches(&self, name: &str) -> bool {
        self.alias == name || self.full_match(name)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable field-definition tables built once from configuration.
///
/// Build rules, applied in entry order:
/// - the first `fields` entry for an id defines its aliases; later ones are ignored
/// - an alias keeps the first id that claimed it for pattern resolution
/// - `values` entries replace any earlier value list for the same id
#[derive(Debug, Default)]
pub struct FieldRegistry {
    patterns: Vec<AliasPattern>,
    aliases: HashMap<String, Vec<String>>,
    values: HashMap<String, Vec<String>>,
    order: Vec<String>,
}

static GLOBAL: OnceLock<FieldRegistry> = OnceLock::new();

impl FieldRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[ConfigEntry]) -> Self {
        let mut registry = Self::default();

        for entry in entries {
            match entry.property {
                FieldProperty::Fields => registry.register_aliases(&entry.field_id, &entry.items),
                FieldProperty::Values => {
                    registry
                        .values
                        .insert(entry.field_id.clone(), entry.items.clone());
                }
            }
        }

        info!(
            "Field registry built: {} fields, {} alias patterns, {} value lists",
            registry.order.len(),
            registry.patterns.len(),
            registry.values.len()
        );
        registry
    }

    /// Build from the form section of the crawl configuration.
    ///
    /// An unreadable source leaves the registry empty.
    pub fn load(config: &FormsConfig) -> Self {
        Self::from_entries(&config.entries())
    }

    /// Process-wide registry, built by `init` on first access only.
    pub fn global(init: impl FnOnce() -> FieldRegistry) -> &'static FieldRegistry {
        GLOBAL.get_or_init(init)
    }

    fn register_aliases(&mut self, field_id: &str, aliases: &[String]) {
        if self.aliases.contains_key(field_id) {
            warn!("Field '{}' already defined; ignoring later alias list", field_id);
            return;
        }
        if aliases.is_empty() {
            warn!("Field '{}' has an empty alias list", field_id);
            return;
        }

        for alias in aliases {
            if let Some(owner) = self.pattern_for(alias).map(|p| p.field_id.as_str()) {
                warn!(
                    "Alias '{}' already belongs to field '{}'; '{}' will not resolve through it",
                    alias, owner, field_id
                );
                continue;
            }
            self.patterns.push(AliasPattern::compile(alias, field_id));
        }

        debug!("Registered field '{}' with aliases {:?}", field_id, aliases);
        self.aliases.insert(field_id.to_string(), aliases.to_vec());
        self.order.push(field_id.to_string());
    }

    /// Compiled pattern for an alias text, whichever field owns it.
    pub fn pattern_for(&self, alias: &str) -> Option<&AliasPattern> {
        self.patterns.iter().find(|p| p.alias == alias)
    }

    /// Alias patterns in registration order.
    pub fn patterns(&self) -> &[AliasPattern] {
        &self.patterns
    }

    pub fn aliases(&self, field_id: &str) -> Option<&[String]> {
        self.aliases.get(field_id).map(Vec::as_slice)
    }

    pub fn values(&self, field_id: &str) -> Option<&[String]> {
        self.values.get(field_id).map(Vec::as_slice)
    }

    /// Number of configured values, 0 for unknown ids.
    pub fn value_count(&self, field_id: &str) -> usize {
        self.values(field_id).map_or(0, <[String]>::len)
    }

    /// True if `field_id` has an alias list or a value list.
    pub fn contains(&self, field_id: &str) -> bool {
        self.registered_id(field_id).is_some()
    }

    /// The registry's own copy of `field_id`, if registered.
    pub fn registered_id(&self, field_id: &str) -> Option<&str> {
        self.aliases
            .get_key_value(field_id)
            .or_else(|| self.values.get_key_value(field_id))
            .map(|(k, _)| k.as_str())
    }

    pub fn definition(&self, field_id: &str) -> Option<FieldDefinition> {
        let aliases = self.aliases.get(field_id)?;
        Some(FieldDefinition {
            id: field_id.to_string(),
            alias_patterns: aliases.clone(),
            values: self.values.get(field_id).cloned().unwrap_or_default(),
        })
    }

    /// All definitions in registration order.
    pub fn definitions(&self) -> Vec<FieldDefinition> {
        self.order
            .iter()
            .filter_map(|id| self.definition(id))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.values.is_empty()
    }
}
