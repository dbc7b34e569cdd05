//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, database, checklist, employee checklist).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Refused by the current state (locked, already active, duplicate).
    pub const CONFLICT: i32 = 5;
}

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "ONBOARDING_CONFIG";

/// Environment variables read for the log filter, in order.
pub const LOG_ENV: [&str; 2] = ["ONBOARDING_LOG", "RUST_LOG"];

/// Log filter used when no environment variable is set.
pub const DEFAULT_LOG_FILTER: &str = "warn";
