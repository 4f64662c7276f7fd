use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::properties::{ConfigEntry, load_properties};

// ============================================================================
// Crawl configuration model (YAML)
// ============================================================================

/// Crawl configuration file: `form-candidates.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlConfig {
    #[serde(default)]
    pub forms: FormsConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Form-filling section of the crawl configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormsConfig {
    /// Invent values for controls no field definition matches
    #[serde(default)]
    pub random_values: bool,

    /// Standalone properties file with `<id>.fields` / `<id>.values` keys
    #[serde(default)]
    pub properties: Option<PathBuf>,

    /// Input specification embedded in the crawl configuration
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// One embedded field definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub id: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_server_script")]
    pub server_script: String,

    #[serde(default = "default_true")]
    pub exclude_iframes: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            server_script: default_server_script(),
            exclude_iframes: true,
        }
    }
}

fn default_server_script() -> String { "node/browser_server.js".to_string() }
fn default_true() -> bool { true }

// ============================================================================
// Form configuration source resolution
// ============================================================================

impl FormsConfig {
    /// Configuration entries for the field registry.
    ///
    /// The embedded specification wins over the standalone file. An
    /// unreadable file is logged and yields no entries.
    pub fn entries(&self) -> Vec<ConfigEntry> {
        if !self.fields.is_empty() {
            return spec_entries(&self.fields);
        }

        let Some(path) = &self.properties else {
            info!("No form field configuration; every control is unmatched");
            return Vec::new();
        };

        match load_properties(path) {
            Ok(entries) => entries,
            Err(e) => {
                error!("{}", e);
                Vec::new()
            }
        }
    }
}

/// Flatten embedded field specs into the same entry sequence a properties
/// file would produce.
pub fn spec_entries(specs: &[FieldSpec]) -> Vec<ConfigEntry> {
    let mut entries = Vec::with_capacity(specs.len() * 2);
    for spec in specs {
        if spec.fields.is_empty() && spec.values.is_empty() {
            warn!("Field '{}' has neither fields nor values", spec.id);
            continue;
        }
        if !spec.fields.is_empty() {
            entries.push(ConfigEntry::fields(spec.id.clone(), spec.fields.clone()));
        }
        if !spec.values.is_empty() {
            entries.push(ConfigEntry::values(spec.id.clone(), spec.values.clone()));
        }
    }
    entries
}
