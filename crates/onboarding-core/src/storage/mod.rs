//! Storage abstractions and implementations.

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStorage;
pub use traits::StorageEngine;
pub use types::{
    Checklist, CommunicationChannel, ComponentType, CustomFulfilment, CustomTask, Employee,
    EmployeeChecklist, Fulfilment, FulfilmentStatus, LifeCycle, Mentor, NewChecklist,
    NewCustomTask, NewOrganization, NewPhase, NewTask, OrganizationUnit, Permission, Phase,
    QuestionType, RoleType, SortOrder, Task,
};
