mod commands;
mod config;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::FieldpatchConfig;

#[derive(Parser)]
#[command(name = "fieldpatch")]
#[command(about = "Change individual fields of iCalendar and vCard records")]
#[command(version)]
struct Cli {
    /// Use this config file instead of ~/.config/fieldpatch/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set fields on the event, task, journal entry or contact in a record
    Update(commands::update::UpdateArgs),
    /// Show config paths and effective settings
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Update(args) => {
            let config = FieldpatchConfig::load(cli.config.as_deref())?;
            commands::update::run(args, &config)
        }
        Commands::Config { init } => commands::config::run(cli.config.as_deref(), init),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("FIELDPATCH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "fieldpatch=debug,fieldpatch_core=debug"
        } else {
            "warn"
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}
