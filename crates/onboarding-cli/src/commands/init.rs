use std::path::PathBuf;

use tracing::info;

use onboarding_core::SqliteStorage;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_database_path, write_config, OnboardingConfig};
use crate::errors::CliError;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let municipality = ctx.cli().municipality.clone().ok_or_else(|| {
        CliError::invalid_input("A municipality is required: pass --municipality <ID>")
    })?;

    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::conflict(
            format!("Config already exists at {}", config_path.display()),
            "Pass --force to overwrite it.",
        )
        .into());
    }

    let database_path = match &ctx.cli().db {
        Some(path) => PathBuf::from(path),
        None => default_database_path()?,
    };
    if let Some(parent) = database_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create database directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let storage = SqliteStorage::open(&database_path)?;
    let schema_version = storage.schema_version()?;

    let config = OnboardingConfig::new(database_path.clone(), municipality);
    write_config(&config_path, &config)?;
    info!(config = %config_path.display(), database = %database_path.display(), "initialized");

    if !ctx.quiet() {
        println!("Initialized onboarding database at {}", database_path.display());
        println!("Schema version: {}", schema_version);
        println!("Config written to {}", config_path.display());
    }
    Ok(())
}
