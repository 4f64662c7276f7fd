use std::io::Write;
use std::path::Path;

use clap::Parser;
use form_candidates::browser::snapshot_driver::SnapshotDriver;
use form_candidates::cli::commands::{build_rng, load_snapshot, run_generation};
use form_candidates::cli::config::{Cli, Commands, apply_cli_overrides, load_config};
use form_candidates::config::crawl_config::CrawlConfig;
use form_candidates::forms::error::FormError;
use form_candidates::forms::form_model::LinkedFieldGroup;
use form_candidates::forms::registry::FieldRegistry;
use form_candidates::trace::logger::TraceLogger;
use rand::Rng;
use tracing::Level;

use crate::common::builders::{ANCHOR, login_registry, strings};

mod common;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_resolve() {
    let cli = Cli::parse_from(["form-candidates", "resolve", "--name", "uname"]);
    match cli.command {
        Commands::Resolve { name } => assert_eq!(name, "uname"),
        _ => panic!("Expected Resolve command"),
    }
    assert_eq!(cli.verbose, 0);
    assert!(!cli.random_values);
}

#[test]
fn cli_parse_select_negative_index() {
    let cli = Cli::parse_from([
        "form-candidates",
        "select",
        "--field",
        "username",
        "--index",
        "-1",
        "--control-type",
        "radio",
    ]);
    match cli.command {
        Commands::Select {
            field,
            index,
            control_type,
        } => {
            assert_eq!(field, "username");
            assert_eq!(index, -1);
            assert_eq!(control_type, "radio");
        }
        _ => panic!("Expected Select command"),
    }
}

#[test]
fn cli_parse_select_defaults() {
    let cli = Cli::parse_from(["form-candidates", "select", "--field", "username"]);
    match cli.command {
        Commands::Select {
            index, control_type, ..
        } => {
            assert_eq!(index, 0);
            assert_eq!(control_type, "text");
        }
        _ => panic!("Expected Select command"),
    }
}

#[test]
fn cli_parse_replay_with_global_flags() {
    let cli = Cli::parse_from([
        "form-candidates",
        "replay",
        "--snapshot",
        "page.json",
        "--group",
        "login",
        "--fields",
        "username,password",
        "--anchor",
        ANCHOR,
        "--random-values",
        "--seed",
        "42",
        "-vv",
    ]);
    assert!(cli.random_values);
    assert_eq!(cli.seed, Some(42));
    assert_eq!(cli.log_level(), Level::DEBUG);
    match cli.command {
        Commands::Replay {
            snapshot,
            group,
            fields,
            anchor,
            trace,
        } => {
            assert_eq!(snapshot, "page.json");
            assert_eq!(group, "login");
            assert_eq!(fields, strings(&["username", "password"]));
            assert_eq!(anchor, ANCHOR);
            assert!(trace.is_none());
        }
        _ => panic!("Expected Replay command"),
    }
}

#[test]
fn cli_parse_generate() {
    let cli = Cli::parse_from([
        "form-candidates",
        "generate",
        "--url",
        "https://example.com/login",
        "--group",
        "login",
        "--fields",
        "username",
        "--anchor",
        ANCHOR,
        "--trace",
        "trace.jsonl",
    ]);
    match cli.command {
        Commands::Generate { url, trace, .. } => {
            assert_eq!(url, "https://example.com/login");
            assert_eq!(trace.as_deref(), Some("trace.jsonl"));
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn cli_requires_fields_for_replay() {
    let result = Cli::try_parse_from([
        "form-candidates",
        "replay",
        "--snapshot",
        "page.json",
        "--group",
        "login",
        "--anchor",
        ANCHOR,
    ]);
    assert!(result.is_err());
}

#[test]
fn log_level_follows_verbosity() {
    let quiet = Cli::parse_from(["form-candidates", "fields"]);
    assert_eq!(quiet.log_level(), Level::WARN);
    let loud = Cli::parse_from(["form-candidates", "-vvvv", "fields"]);
    assert_eq!(loud.log_level(), Level::TRACE);
}

// ============================================================================
// Config loading and overrides
// ============================================================================

#[test]
fn load_config_missing_file_returns_defaults() {
    let config = load_config(Some("/nonexistent/form-candidates.yaml"));
    assert!(!config.forms.random_values);
    assert_eq!(config.browser.server_script, "node/browser_server.js");
}

#[test]
fn load_config_malformed_returns_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "forms: [not, a, map").unwrap();
    let config = load_config(file.path().to_str());
    assert!(config.forms.fields.is_empty());
}

#[test]
fn load_config_reads_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "forms:\n  random_values: true\n  properties: forms.properties").unwrap();
    let config = load_config(file.path().to_str());
    assert!(config.forms.random_values);
    assert_eq!(config.forms.properties.as_deref(), Some(Path::new("forms.properties")));
}

#[test]
fn cli_overrides_config() {
    let yaml = "forms:\n  fields:\n    - id: a\n      fields: [a]\n";
    let config: CrawlConfig = serde_yaml::from_str(yaml).unwrap();
    let cli = Cli::parse_from([
        "form-candidates",
        "--form-properties",
        "tests/fixtures/forms.properties",
        "--random-values",
        "fields",
    ]);

    let merged = apply_cli_overrides(config, &cli);
    assert!(merged.forms.random_values);
    assert!(merged.forms.fields.is_empty(), "Explicit properties file replaces embedded fields");
    assert_eq!(FieldRegistry::load(&merged.forms).value_count("username"), 3);
}

#[test]
fn seeded_rng_is_reproducible() {
    let a: u64 = build_rng(Some(9)).r#gen();
    let b: u64 = build_rng(Some(9)).r#gen();
    assert_eq!(a, b);
}

// ============================================================================
// Replay
// ============================================================================

#[test]
fn snapshot_fixture_replays_with_trace() {
    let registry = login_registry();
    let config = CrawlConfig::default();
    let document = load_snapshot(Path::new("tests/fixtures/login_snapshot.json"), true).unwrap();
    let mut driver = SnapshotDriver::new(document);

    let dir = tempfile::tempdir().unwrap();
    let trace_path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(trace_path.to_str().unwrap());
    assert!(tracer.is_enabled());

    let group = LinkedFieldGroup::new("login", strings(&["username", "password"]));
    let generation = run_generation(
        &mut driver,
        &registry,
        &config,
        &group,
        "/HTML[1]/BODY[1]/FORM[1]/BUTTON[1]",
        &tracer,
        &mut build_rng(Some(1)),
    );

    assert_eq!(generation.candidates.len(), 3);
    assert_eq!(generation.candidates[1].value_of("user"), Some("bob"));

    let content = std::fs::read_to_string(&trace_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(event["group_id"], "login");
    assert_eq!(event["max_values"], 3);
    assert_eq!(event["candidates"][2]["marker"], "login_2");
    assert_eq!(event["candidates"][0]["filled"], serde_json::json!(["user", "pass"]));
    assert!(event["snapshot"].is_string());
}

#[test]
fn missing_snapshot_file_is_document_unavailable() {
    let err = load_snapshot(Path::new("tests/fixtures/none.json"), true).unwrap_err();
    assert!(matches!(err, FormError::DocumentUnavailable(_)), "Unexpected error: {:?}", err);
}

#[test]
fn disabled_tracer_ignores_events() {
    let tracer = TraceLogger::disabled();
    assert!(!tracer.is_enabled());
    let mut driver = SnapshotDriver::unavailable();
    let generation = run_generation(
        &mut driver,
        &FieldRegistry::empty(),
        &CrawlConfig::default(),
        &LinkedFieldGroup::new("g", strings(&["x"])),
        ANCHOR,
        &tracer,
        &mut build_rng(Some(1)),
    );
    assert!(generation.candidates.is_empty());
}
