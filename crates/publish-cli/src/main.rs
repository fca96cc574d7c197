//! gh-publish CLI
//!
//! Publishes a local folder as a GitHub repository.

mod cli;
mod commands;
mod error;

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use publish_core::{ConfigResolver, PublishConfig};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        match &e {
            CliError::Reported { .. } => {}
            CliError::Usage(usage) => {
                let _ = usage.print();
            }
            _ => {
                eprintln!("{}: {}", "error".red().bold(), e);
                if let Some(hint) = e.hint() {
                    eprintln!("{}: {}", "hint".yellow().bold(), hint);
                }
            }
        }
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::try_parse()?;

    // Setup tracing if verbose; logs go to stderr so --json output stays clean
    if cli.verbose {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
        tracing::debug!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        println!("{} Publish a folder to GitHub", "gh-publish".green().bold());
        println!();
        println!("Run {} for available commands.", "gh-publish --help".cyan());
        return Ok(());
    };

    match command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "gh-publish", &mut io::stdout());
            Ok(())
        }
        Commands::Publish(args) => commands::run_publish(args, resolve_config(cli.config)?),
        Commands::Status { folder, json } => {
            commands::run_status(&folder, json, resolve_config(cli.config)?)
        }
        Commands::Doctor => commands::run_doctor(&resolve_config(cli.config)?),
    }
}

fn resolve_config(explicit: Option<PathBuf>) -> Result<PublishConfig> {
    Ok(ConfigResolver::new().with_explicit(explicit).resolve()?)
}
