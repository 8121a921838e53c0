// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use sigil_cli::commands;
use sigil_cli::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sigil")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Render and check directive-based text templates", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Config file (defaults to ./sigil.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template with JSON data
    Render {
        /// Template file
        template: PathBuf,
        /// JSON file holding an object of render data
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Nested template passed as a value: name=path (repeatable)
        #[arg(short, long = "partial")]
        partials: Vec<String>,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse and compile templates without rendering
    Check {
        /// Template files
        #[arg(required = true)]
        templates: Vec<PathBuf>,
    },
    /// Show the keys, data needs and structure of a template
    Inspect {
        /// Template file
        template: PathBuf,
        /// Also print the node tree as JSON
        #[arg(long)]
        ast: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let filter = EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let engine = config.engine()?;

    match cli.command {
        Commands::Render {
            template,
            data,
            partials,
            output,
        } => commands::render::run(
            &engine,
            &template,
            data.as_deref(),
            &partials,
            output.as_deref(),
        ),
        Commands::Check { templates } => commands::check::run(&engine, &templates),
        Commands::Inspect { template, ast } => commands::inspect::run(&engine, &template, ast),
    }
}
