pub mod checklist;
pub mod employee;
pub mod init;
pub mod org;
pub mod phase;
pub mod sort_order;
