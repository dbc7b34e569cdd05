//! Application-level utilities for the Onboarding CLI.
//!
//! This module provides:
//! - Path resolution for the config file and database
//! - The per-invocation context handed to command handlers

mod context;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use resolver::{load_config, resolve_config_path};
