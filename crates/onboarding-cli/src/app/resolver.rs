//! Path resolution for the config file.

use std::path::PathBuf;

use crate::config::{default_config_path, read_config, OnboardingConfig};
use crate::constants::CONFIG_ENV;

/// Resolve the config file path, checking ONBOARDING_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var(CONFIG_ENV) {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Read the config file if there is one.
pub fn load_config() -> anyhow::Result<Option<OnboardingConfig>> {
    let path = resolve_config_path()?;
    if !path.exists() {
        return Ok(None);
    }
    read_config(&path).map(Some)
}

/// Hint shown when neither a config file nor an override is available.
pub fn missing_config_hint() -> &'static str {
    concat!(
        "Run:\n  onboarding init --municipality <ID>\n\n",
        "Or pass the settings directly:\n",
        "  ONBOARDING_DB=/path/to/onboarding.db ONBOARDING_MUNICIPALITY=<ID> onboarding ...",
    )
}
