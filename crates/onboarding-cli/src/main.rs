//! Onboarding CLI - versioned onboarding checklists for organization units and employees
//!
//! This is the command-line interface for Onboarding. It wires the config file,
//! logging and the SQLite database to the core library.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::{load_config, AppContext};
use crate::cli::{Cli, Commands};
use crate::config::OnboardingConfig;
use crate::constants::{DEFAULT_LOG_FILTER, LOG_ENV};
use crate::errors::CliError;

fn log_filter() -> EnvFilter {
    for name in LOG_ENV {
        if let Ok(value) = std::env::var(name) {
            if let Ok(filter) = EnvFilter::try_new(value.trim()) {
                return filter;
            }
        }
    }
    EnvFilter::new(DEFAULT_LOG_FILTER)
}

/// Log to stderr so JSON output on stdout stays machine-readable.
fn init_logging(json: bool) {
    let filter = log_filter();
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: &Cli, config: Option<OnboardingConfig>) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli, config);
    match &cli.command {
        Commands::Init(args) => commands::init::handle_init(&ctx, args),
        Commands::Org(command) => commands::org::handle(&ctx, command),
        Commands::Phase(command) => commands::phase::handle(&ctx, command),
        Commands::Checklist(command) => commands::checklist::handle(&ctx, command),
        Commands::Employee(command) => commands::employee::handle(&ctx, command),
        Commands::SortOrder(command) => commands::sort_order::handle(&ctx, command),
    }
}

fn main() {
    let cli = Cli::parse();

    // `init` may be overwriting a broken config, so it never reads one.
    let config = match &cli.command {
        Commands::Init(_) => Ok(None),
        _ => load_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            init_logging(false);
            CliError::from_anyhow(err).exit()
        }
    };

    init_logging(config.as_ref().map(|config| config.log.json).unwrap_or(false));
    tracing::debug!(command = ?std::env::args().nth(1), "starting");

    if let Err(err) = run(&cli, config) {
        tracing::debug!(error = %err, "command failed");
        CliError::from_anyhow(err).exit()
    }
}
