//! # Onboarding Core
//!
//! Core library for onboarding checklists: versioned checklist templates
//! attached to organization units, per-employee checklists and their
//! fulfilment.
//!
//! This crate provides the domain logic, storage abstractions and data models
//! independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **storage**: Storage engine trait, SQLite implementation, data model
//! - **versioning**: Version cloning, life cycle rules, task identity matching
//! - **resolver**: Checklist resolution along an organizational path
//! - **view**: Phase/task read models
//! - **fulfilment**: Fulfilment upserts and completion
//! - **overlay**: Organization-specific sort order
//! - **service**: Request-level operations tying the above together

pub mod error;
pub mod fulfilment;
pub mod overlay;
pub mod resolver;
pub mod service;
pub mod storage;
pub mod versioning;
pub mod view;

pub use error::{OnboardingError, Result};
pub use fulfilment::{aggregate_fulfilment, FulfilmentUpdate};
pub use overlay::apply_sort_order;
pub use resolver::{resolve_checklists, OrganizationPath};
pub use service::{Activation, EmployeeChecklistSettings, Initiation, Onboarding};
pub use storage::{SqliteStorage, StorageEngine};
pub use versioning::{clone_checklist, match_task_ids};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
