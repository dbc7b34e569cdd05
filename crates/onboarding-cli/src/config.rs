use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use onboarding_core::EmployeeChecklistSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingConfig {
    pub database: DatabaseSection,
    pub municipality: MunicipalitySection,
    #[serde(default)]
    pub employee: EmployeeSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalitySection {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSection {
    pub default_duration_days: u64,
    pub expiration_grace_days: u64,
}

impl Default for EmployeeSection {
    fn default() -> Self {
        let settings = EmployeeChecklistSettings::default();
        Self {
            default_duration_days: settings.default_duration_days,
            expiration_grace_days: settings.expiration_grace_days,
        }
    }
}

impl EmployeeSection {
    pub fn settings(&self) -> EmployeeChecklistSettings {
        EmployeeChecklistSettings {
            default_duration_days: self.default_duration_days,
            expiration_grace_days: self.expiration_grace_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LogSection {
    /// Emit log lines as JSON
    #[serde(default)]
    pub json: bool,
}

impl OnboardingConfig {
    pub fn new(database_path: PathBuf, municipality_id: String) -> Self {
        Self {
            database: DatabaseSection {
                path: database_path.to_string_lossy().to_string(),
            },
            municipality: MunicipalitySection { id: municipality_id },
            employee: EmployeeSection::default(),
            log: LogSection::default(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_database_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("onboarding.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<OnboardingConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &OnboardingConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("onboarding"));
        }
    }
    Ok(home_dir()?.join(".config").join("onboarding"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("onboarding"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("onboarding"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
