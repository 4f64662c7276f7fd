use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::browser::dom::Document;
use crate::browser::driver::BrowserDriver;
use crate::browser::session::BrowserSession;
use crate::browser::snapshot_driver::SnapshotDriver;
use crate::config::crawl_config::CrawlConfig;
use crate::forms::candidate::{CandidateGenerator, Generation};
use crate::forms::error::FormError;
use crate::forms::form_model::{InputType, LinkedFieldGroup};
use crate::forms::random::RandomValueGenerator;
use crate::forms::registry::FieldRegistry;
use crate::forms::resolver::FieldResolver;
use crate::forms::selector::ValueSelector;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::GenerationEvent;

pub fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

// ============================================================================
// fields / resolve / select subcommands
// ============================================================================

pub fn cmd_fields(registry: &FieldRegistry) -> Result<(), Box<dyn std::error::Error>> {
    let definitions = registry.definitions();
    if definitions.is_empty() {
        println!("No field definitions configured");
        return Ok(());
    }
    for def in &definitions {
        println!(
            "{}: aliases [{}] values [{}]",
            def.id,
            def.alias_patterns.join(", "),
            def.values.join(", ")
        );
    }
    Ok(())
}

pub fn cmd_resolve(registry: &FieldRegistry, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    match FieldResolver::new(registry).resolve(name) {
        Some(id) => println!("{}", id),
        None => println!("unmatched"),
    }
    Ok(())
}

pub fn cmd_select<R: Rng + ?Sized>(
    registry: &FieldRegistry,
    field: &str,
    index: i64,
    control_type: &str,
    rng: &mut R,
) -> Result<(), Box<dyn std::error::Error>> {
    let input_type = InputType::from(control_type.to_string());
    match ValueSelector::new(registry).select(field, index, &input_type, rng) {
        Some(value) => println!("{}", serde_json::to_string(&value)?),
        None => println!("no value"),
    }
    Ok(())
}

// ============================================================================
// replay / generate subcommands
// ============================================================================

/// Load a saved snapshot file into a document.
pub fn load_snapshot(path: &Path, exclude_iframes: bool) -> Result<Document, FormError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        FormError::DocumentUnavailable(format!("cannot read {}: {}", path.display(), e))
    })?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| FormError::JsonParse {
        context: path.display().to_string(),
        source: e,
    })?;
    Document::from_json(value, exclude_iframes)
}

/// Run one generation and record it in the trace.
pub fn run_generation<D, R>(
    driver: &mut D,
    registry: &FieldRegistry,
    config: &CrawlConfig,
    group: &LinkedFieldGroup,
    anchor: &str,
    tracer: &TraceLogger,
    rng: &mut R,
) -> Generation
where
    D: BrowserDriver + ?Sized,
    R: Rng + ?Sized,
{
    let generator = CandidateGenerator::new(registry, RandomValueGenerator::new(config.forms.random_values))
        .include_iframes(!config.browser.exclude_iframes);
    let generation = generator.generate_traced(driver, group, anchor, rng);
    tracer.log(&GenerationEvent::now(group, anchor).with_generation(&generation));
    generation
}

fn print_generation(generation: &Generation) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&generation.candidates)?);
    if !generation.omitted_fields.is_empty() {
        eprintln!("Omitted fields: {}", generation.omitted_fields.join(", "));
    }
    Ok(())
}

fn tracer_for(path: Option<&str>) -> TraceLogger {
    path.map(TraceLogger::new).unwrap_or_else(TraceLogger::disabled)
}

pub fn cmd_replay<R: Rng + ?Sized>(
    registry: &FieldRegistry,
    config: &CrawlConfig,
    snapshot: &str,
    group: &LinkedFieldGroup,
    anchor: &str,
    trace: Option<&str>,
    rng: &mut R,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = load_snapshot(Path::new(snapshot), config.browser.exclude_iframes)?;
    let mut driver = SnapshotDriver::new(document);
    let tracer = tracer_for(trace);

    let generation = run_generation(&mut driver, registry, config, group, anchor, &tracer, rng);
    print_generation(&generation)
}

pub fn cmd_generate<R: Rng + ?Sized>(
    registry: &FieldRegistry,
    config: &CrawlConfig,
    url: &str,
    group: &LinkedFieldGroup,
    anchor: &str,
    trace: Option<&str>,
    rng: &mut R,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = BrowserSession::launch(&config.browser.server_script)?;
    let tracer = tracer_for(trace);

    info!("Opening {}", url);
    session.navigate(url)?;

    let generation = run_generation(&mut session, registry, config, group, anchor, &tracer, rng);
    session.quit()?;
    print_generation(&generation)
}
