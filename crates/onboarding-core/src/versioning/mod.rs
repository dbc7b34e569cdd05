//! Checklist versioning: cloning, life cycle rules and task matching.

pub mod clone;
pub mod lifecycle;
pub mod matcher;

pub use clone::clone_checklist;
pub use matcher::{is_structurally_equal, match_task_ids, repoint_fulfilments};
