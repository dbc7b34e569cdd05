//! Argument parsing helpers shared by command handlers.

use std::str::FromStr;

use chrono::NaiveDate;
use uuid::Uuid;

use onboarding_core::OnboardingError;

use crate::errors::CliError;

/// Parse a full UUID argument.
pub fn parse_id(value: &str, what: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| CliError::invalid_input(format!("Invalid {} ID: {}", what, value)).into())
}

/// Parse a YYYY-MM-DD date.
pub fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CliError::invalid_input(format!("Invalid date (expected YYYY-MM-DD): {}", value)).into()
    })
}

/// Parse one of the core's stored enum names, e.g. `TRUE` or `new-employee`.
pub fn parse_named<T>(value: &str) -> anyhow::Result<T>
where
    T: FromStr<Err = OnboardingError>,
{
    T::from_str(value).map_err(|err| CliError::invalid_input(err.to_string()).into())
}

/// Parse an optional enum name, falling back to `default`.
pub fn parse_named_or<T>(value: Option<&str>, default: T) -> anyhow::Result<T>
where
    T: FromStr<Err = OnboardingError>,
{
    match value {
        Some(value) => parse_named(value),
        None => Ok(default),
    }
}

/// First eight characters of an ID for compact tables.
pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}
