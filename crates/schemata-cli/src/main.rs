//! Schemata Command-Line Inspector
//!
//! Loads a declaration manifest, resolves it and prints the result.

mod commands;
mod formatter;

use clap::{Parser, Subcommand};
use commands::{CliError, Stage};
use formatter::OutputFormat;
use std::path::PathBuf;
use tracing::debug;

/// Schemata Command-Line Inspector
#[derive(Parser, Debug)]
#[command(name = "schemata")]
#[command(version, about = "Inspect schemata declaration manifests")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a manifest and print a summary
    Check {
        /// Manifest file (JSON)
        manifest: PathBuf,
    },

    /// Print the resolved schema map
    Resolve {
        /// Manifest file (JSON)
        manifest: PathBuf,

        /// Output format
        #[arg(long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Run one value through an attribute's coercion pipeline
    Coerce {
        /// Manifest file (JSON)
        manifest: PathBuf,

        /// Schema key
        #[arg(long)]
        schema: String,

        /// Attribute name
        #[arg(long)]
        attribute: String,

        /// Value as JSON (raw text for orm-filter); omit for undefined
        #[arg(long)]
        value: Option<String>,

        /// Pipeline to run
        #[arg(long, default_value = "client", value_enum)]
        stage: Stage,

        /// Output format
        #[arg(long, default_value = "json", value_enum)]
        format: OutputFormat,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
                .add_directive("schemata=info".parse().expect("static directive"))
                .add_directive("schemata_core=info".parse().expect("static directive")),
        )
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<String, CliError> {
    debug!(command = ?args.command, "running command");
    match args.command {
        Command::Check { manifest } => {
            let map = schemata_core::build_manifest(&manifest)?;
            Ok(commands::check(&map))
        }
        Command::Resolve { manifest, format } => {
            let map = schemata_core::build_manifest(&manifest)?;
            let formatter = formatter::create_formatter(format);
            Ok(commands::resolve(&map, &*formatter))
        }
        Command::Coerce {
            manifest,
            schema,
            attribute,
            value,
            stage,
            format,
        } => {
            let map = schemata_core::build_manifest(&manifest)?;
            let formatter = formatter::create_formatter(format);
            commands::coerce(
                &map,
                &schema,
                &attribute,
                value.as_deref(),
                stage,
                &*formatter,
            )
        }
    }
}
