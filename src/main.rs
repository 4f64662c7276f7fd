use clap::Parser;
use form_candidates::cli::commands::{
    build_rng, cmd_fields, cmd_generate, cmd_replay, cmd_resolve, cmd_select,
};
use form_candidates::cli::config::{Cli, Commands, apply_cli_overrides, load_config};
use form_candidates::forms::form_model::LinkedFieldGroup;
use form_candidates::forms::registry::FieldRegistry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    // Resolve settings: CLI > config file > defaults
    let config = apply_cli_overrides(load_config(cli.config.as_deref()), &cli);
    let registry = FieldRegistry::global(|| FieldRegistry::load(&config.forms));
    let mut rng = build_rng(cli.seed);

    match cli.command {
        Commands::Fields => cmd_fields(registry)?,
        Commands::Resolve { name } => cmd_resolve(registry, &name)?,
        Commands::Select {
            field,
            index,
            control_type,
        } => cmd_select(registry, &field, index, &control_type, &mut rng)?,
        Commands::Replay {
            snapshot,
            group,
            fields,
            anchor,
            trace,
        } => {
            let group = LinkedFieldGroup::new(group, fields);
            cmd_replay(
                registry,
                &config,
                &snapshot,
                &group,
                &anchor,
                trace.as_deref(),
                &mut rng,
            )?;
        }
        Commands::Generate {
            url,
            group,
            fields,
            anchor,
            trace,
        } => {
            let group = LinkedFieldGroup::new(group, fields);
            cmd_generate(
                registry,
                &config,
                &url,
                &group,
                &anchor,
                trace.as_deref(),
                &mut rng,
            )?;
        }
    }

    Ok(())
}
