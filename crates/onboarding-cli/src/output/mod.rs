//! Output formatting helpers for the CLI.
//!
//! Every listing and view can be printed as pretty JSON (`--json`) or as a
//! human-readable table.

mod json;
mod text;

// Re-export public API
pub use json::print_json;
pub use text::{print_checklist_view, print_employee_checklist_view, print_table};
