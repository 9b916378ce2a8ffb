mod commands;
mod diagnostics;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wikiref::EntityType;

use crate::commands::ResolveOptions;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "WIKIREF_LOG";

#[derive(Parser)]
#[command(name = "wikiref", version, about = "Resolve wiki resource references")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log resolution decisions (same as WIKIREF_LOG=debug)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every link in the content directory and report broken ones
    Check {
        /// Print broken links as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve one reference and print the absolute result
    Resolve {
        /// Base reference; repeat to chain, outermost first
        #[arg(long = "base", value_name = "REF")]
        bases: Vec<String>,
        /// Current document (defaults to the default home page)
        #[arg(long, value_name = "REF")]
        current: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Raw reference, e.g. `Space.Page` or `Page@file.png`
        reference: String,
        /// Use the relative resolver family
        #[arg(long)]
        relative: bool,
        /// Resource type of the reference
        #[arg(long = "type", default_value = "doc")]
        resource_type: String,
        /// Entity kind to print the result as (defaults to the type's own kind)
        #[arg(long, value_parser = parse_entity_type)]
        target: Option<EntityType>,
        /// The type was written explicitly: skip existence fallback
        #[arg(long)]
        typed: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { json } => commands::check(json),
        Commands::Resolve {
            bases,
            current,
            json,
            reference,
            relative,
            resource_type,
            target,
            typed,
        } => {
            let target = target.unwrap_or_else(|| return native_kind(&resource_type));
            commands::resolve(&ResolveOptions {
                bases,
                current,
                json,
                reference,
                relative,
                resource_type,
                target,
                typed,
            })
        },
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3)
        },
    };
}

/// Install the stderr subscriber. `WIKIREF_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| return EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    return;
}

/// Entity kind a resource type resolves to; unknown schemes default to documents.
fn native_kind(resource_type: &str) -> EntityType {
    let scheme = resource_type.strip_prefix(wikiref::types::RELATIVE_PREFIX).unwrap_or(resource_type);
    return scheme.parse().unwrap_or(EntityType::Document);
}

/// Clap value parser for `--target`.
fn parse_entity_type(raw: &str) -> Result<EntityType, String> {
    return raw.parse::<EntityType>().map_err(|e| return e.to_string());
}
