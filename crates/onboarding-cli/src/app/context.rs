//! Application context for the Onboarding CLI.
//!
//! Combines CLI arguments with the config file so handlers do not resolve
//! paths and settings themselves.

use std::path::PathBuf;

use onboarding_core::{EmployeeChecklistSettings, Onboarding, SqliteStorage};

use crate::cli::Cli;
use crate::config::OnboardingConfig;
use crate::errors::CliError;

use super::resolver::{missing_config_hint, resolve_config_path};

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: Option<OnboardingConfig>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli, config: Option<OnboardingConfig>) -> Self {
        Self { cli, config }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// User recorded as last saved by.
    pub fn user(&self) -> &str {
        &self.cli.user
    }

    /// Database path from `--db`/`ONBOARDING_DB`, else from the config file.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.cli.db {
            return Ok(PathBuf::from(path));
        }
        match &self.config {
            Some(config) => Ok(PathBuf::from(&config.database.path)),
            None => Err(self.missing_config()?.into()),
        }
    }

    /// Municipality from `--municipality`/`ONBOARDING_MUNICIPALITY`, else from the config file.
    pub fn municipality(&self) -> anyhow::Result<String> {
        if let Some(id) = &self.cli.municipality {
            return Ok(id.clone());
        }
        match &self.config {
            Some(config) => Ok(config.municipality.id.clone()),
            None => Err(self.missing_config()?.into()),
        }
    }

    pub fn settings(&self) -> EmployeeChecklistSettings {
        self.config
            .as_ref()
            .map(|config| config.employee.settings())
            .unwrap_or_default()
    }

    /// Open the database. It must have been created by `onboarding init`.
    pub fn open(&self) -> anyhow::Result<Onboarding<SqliteStorage>> {
        let path = self.database_path()?;
        if !path.exists() {
            return Err(CliError::not_found(
                format!("No database found at {}", path.display()),
                "Run:\n  onboarding init --municipality <ID>",
            )
            .into());
        }
        let storage = SqliteStorage::open(&path)?;
        Ok(Onboarding::with_settings(storage, self.settings()))
    }

    fn missing_config(&self) -> anyhow::Result<CliError> {
        let config_path = resolve_config_path()?;
        Ok(CliError::not_found(
            format!("No config found at {}", config_path.display()),
            missing_config_hint(),
        ))
    }
}
