use clap::{Parser, Subcommand};
use tracing::Level;

use crate::config::crawl_config::CrawlConfig;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-candidates",
    version,
    about = "Resolve form-control values and build fill candidates for a crawler"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: form-candidates.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Properties file with <id>.fields / <id>.values keys (overrides the config file)
    #[arg(long, global = true)]
    pub form_properties: Option<String>,

    /// Invent values for controls no field definition matches
    #[arg(long, global = true)]
    pub random_values: bool,

    /// Seed for random value choices
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured field definitions
    Fields,

    /// Resolve a control name or id to its field id
    Resolve {
        /// Control name or id attribute
        #[arg(long)]
        name: String,
    },

    /// Select the configured value for a field at a combination index
    Select {
        /// Field id
        #[arg(long)]
        field: String,

        /// Combination index (negative picks at random)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        index: i64,

        /// Control type: text, textarea, select, checkbox, radio, ...
        #[arg(long, default_value = "text")]
        control_type: String,
    },

    /// Generate candidates from a saved document snapshot (JSON)
    Replay {
        /// Snapshot file
        #[arg(long)]
        snapshot: String,

        /// Linked-field group id (marker prefix)
        #[arg(long)]
        group: String,

        /// Linked field names, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        fields: Vec<String>,

        /// Absolute XPath of the anchor control
        #[arg(long)]
        anchor: String,

        /// Append a generation trace line to this JSONL file
        #[arg(long)]
        trace: Option<String>,
    },

    /// Open a page in the browser and generate candidates against it
    Generate {
        /// URL of the page holding the form
        #[arg(long)]
        url: String,

        /// Linked-field group id (marker prefix)
        #[arg(long)]
        group: String,

        /// Linked field names, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        fields: Vec<String>,

        /// Absolute XPath of the anchor control
        #[arg(long)]
        anchor: String,

        /// Append a generation trace line to this JSONL file
        #[arg(long)]
        trace: Option<String>,
    },
}

impl Cli {
    /// Log level for the `-v` count.
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> CrawlConfig {
    let config_path = path.unwrap_or("form-candidates.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed config '{}': {}", config_path, e);
            CrawlConfig::default()
        }),
        Err(_) => CrawlConfig::default(),
    }
}

/// Merge CLI flags into the loaded config. An explicit properties file
/// replaces any embedded field specification.
pub fn apply_cli_overrides(mut config: CrawlConfig, cli: &Cli) -> CrawlConfig {
    if let Some(path) = &cli.form_properties {
        config.forms.properties = Some(path.into());
        config.forms.fields.clear();
    }
    if cli.random_values {
        config.forms.random_values = true;
    }
    config
}
