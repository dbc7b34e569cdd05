//! Error types for onboarding core operations.
//!
//! Every variant carries a human-readable message with the offending
//! identifiers already interpolated, so callers can surface it directly.

use thiserror::Error;

/// Result type alias for onboarding operations.
pub type Result<T> = std::result::Result<T, OnboardingError>;

/// Core error type for onboarding operations.
#[derive(Debug, Error)]
pub enum OnboardingError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// No organizational unit on the employee's path has an active checklist
    #[error(
        "No matching checklist found for employee '{employee}' (searched organizations: {})",
        format_searched(searched)
    )]
    NoMatchingChecklist { employee: String, searched: Vec<i32> },

    /// Employee checklist is locked against further changes
    #[error("Employee checklist {0} is locked and cannot be updated")]
    Locked(String),

    /// Operation conflicts with the current state of a resource
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn format_searched(searched: &[i32]) -> String {
    searched
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<rusqlite::Error> for OnboardingError {
    fn from(err: rusqlite::Error) -> Self {
        OnboardingError::Storage(format!("SQLite error: {}", err))
    }
}

impl From<serde_json::Error> for OnboardingError {
    fn from(err: serde_json::Error) -> Self {
        OnboardingError::Serialization(err.to_string())
    }
}
