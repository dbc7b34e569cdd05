//! Core data types for the storage layer.
//!
//! Relationships are expressed as id fields rather than object references:
//! tasks point at their phase, checklists at their owning organization, and
//! employee checklists at the checklists they were initiated from.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::OnboardingError;

/// Declares a fieldless enum stored as its SCREAMING_SNAKE_CASE name.
macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = OnboardingError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(OnboardingError::InvalidInput(format!(
                        "Unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

stored_enum! {
    /// Life cycle of a checklist version.
    pub enum LifeCycle {
        /// Draft; the only state in which a checklist may be edited or deleted
        Created => "CREATED",
        Active => "ACTIVE",
        /// Superseded by a newer version
        Deprecated => "DEPRECATED",
    }
}

stored_enum! {
    /// Who is expected to perform a task.
    pub enum RoleType {
        NewEmployee => "NEW_EMPLOYEE",
        NewManager => "NEW_MANAGER",
        ManagerForNewEmployee => "MANAGER_FOR_NEW_EMPLOYEE",
        ManagerForNewManager => "MANAGER_FOR_NEW_MANAGER",
    }
}

stored_enum! {
    /// Expected response shape for a task.
    pub enum QuestionType {
        YesOrNo => "YES_OR_NO",
        YesOrNoWithText => "YES_OR_NO_WITH_TEXT",
        CompletedOrNotRelevant => "COMPLETED_OR_NOT_RELEVANT",
        CompletedOrNotRelevantWithText => "COMPLETED_OR_NOT_RELEVANT_WITH_TEXT",
    }
}

stored_enum! {
    /// Permission required to edit a phase or task.
    pub enum Permission {
        Admin => "ADMIN",
        Superadmin => "SUPERADMIN",
    }
}

stored_enum! {
    /// Tri-state completion value of a fulfilment record.
    pub enum FulfilmentStatus {
        True => "TRUE",
        False => "FALSE",
        /// Not yet answered; distinct from `False`
        Empty => "EMPTY",
    }
}

stored_enum! {
    /// Communication channel enabled for an organization unit.
    pub enum CommunicationChannel {
        Email => "EMAIL",
        NoCommunication => "NO_COMMUNICATION",
    }
}

stored_enum! {
    /// Kind of component a sort-order override targets.
    pub enum ComponentType {
        Phase => "PHASE",
        Task => "TASK",
    }
}

impl FulfilmentStatus {
    /// TRUE and FALSE both count as answered; only EMPTY does not.
    pub fn is_answered(&self) -> bool {
        !matches!(self, FulfilmentStatus::Empty)
    }
}

impl Default for FulfilmentStatus {
    fn default() -> Self {
        FulfilmentStatus::Empty
    }
}

/// An organization unit (company, division or department).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationUnit {
    pub id: Uuid,

    /// Organization number, unique per municipality
    pub organization_number: i32,

    pub organization_name: String,

    pub municipality_id: String,

    pub communication_channels: BTreeSet<CommunicationChannel>,

    pub created: DateTime<Utc>,

    pub updated: DateTime<Utc>,
}

/// A phase groups tasks; phases are shared by every version of a checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: Uuid,

    pub municipality_id: String,

    pub name: String,

    pub body_text: Option<String>,

    /// ISO-8601 duration, e.g. "P1M"
    pub time_to_complete: Option<String>,

    pub permission: Permission,

    /// Structural sort order (not unique)
    pub sort_order: i32,

    pub created: DateTime<Utc>,

    pub updated: DateTime<Utc>,

    pub last_saved_by: Option<String>,
}

/// A template task ("common task") belonging to one checklist version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// `None` until the task has been persisted
    pub id: Option<Uuid>,

    pub phase_id: Option<Uuid>,

    pub heading: String,

    pub heading_reference: Option<String>,

    pub text: Option<String>,

    pub sort_order: i32,

    pub role_type: RoleType,

    pub question_type: QuestionType,

    pub permission: Permission,

    pub created: Option<DateTime<Utc>>,

    pub updated: Option<DateTime<Utc>>,

    pub last_saved_by: Option<String>,
}

/// A versioned checklist template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    /// `None` until the checklist has been persisted
    pub id: Option<Uuid>,

    /// Unique per municipality and version
    pub name: String,

    pub display_name: String,

    pub version: i32,

    pub life_cycle: LifeCycle,

    pub municipality_id: String,

    /// Organization unit the checklist is attached to
    pub organization_id: Option<Uuid>,

    pub tasks: Vec<Task>,

    pub created: Option<DateTime<Utc>>,

    pub updated: Option<DateTime<Utc>>,

    pub last_saved_by: Option<String>,
}

impl Checklist {
    /// Task ids of persisted tasks, in stored order.
    pub fn task_ids(&self) -> Vec<Uuid> {
        self.tasks.iter().filter_map(|task| task.id).collect()
    }

    pub fn find_task(&self, id: &Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id.as_ref() == Some(id))
    }
}

/// The employee an employee checklist belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Identifier from the HR directory
    pub id: String,

    pub username: String,

    pub first_name: String,

    pub last_name: String,

    pub email: Option<String>,

    pub manager_username: Option<String>,
}

/// A mentor assigned to a new employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mentor {
    pub user_id: String,

    pub name: String,
}

/// A task added to a single employee checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTask {
    pub id: Uuid,

    pub phase_id: Uuid,

    pub heading: String,

    pub text: Option<String>,

    pub sort_order: i32,

    pub role_type: RoleType,

    pub question_type: QuestionType,

    pub created: DateTime<Utc>,

    pub updated: DateTime<Utc>,

    pub last_saved_by: Option<String>,
}

/// Completion record for a common task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fulfilment {
    pub task_id: Uuid,

    pub status: FulfilmentStatus,

    pub response_text: Option<String>,

    pub last_saved_by: String,

    pub updated: DateTime<Utc>,
}

/// Completion record for a custom task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFulfilment {
    pub custom_task_id: Uuid,

    pub status: FulfilmentStatus,

    pub response_text: Option<String>,

    pub last_saved_by: String,

    pub updated: DateTime<Utc>,
}

/// A per-employee checklist instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeChecklist {
    pub id: Uuid,

    pub municipality_id: String,

    pub employee: Employee,

    /// Checklists this instance was initiated from, most specific first
    pub checklist_ids: Vec<Uuid>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub expiration_date: NaiveDate,

    pub locked: bool,

    pub mentor: Option<Mentor>,

    pub custom_tasks: Vec<CustomTask>,

    pub fulfilments: Vec<Fulfilment>,

    pub custom_fulfilments: Vec<CustomFulfilment>,

    pub created: DateTime<Utc>,

    pub updated: DateTime<Utc>,
}

impl EmployeeChecklist {
    pub fn find_custom_task(&self, id: &Uuid) -> Option<&CustomTask> {
        self.custom_tasks.iter().find(|task| task.id == *id)
    }
}

/// Organization-scoped display position for a phase or task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub municipality_id: String,

    pub organization_number: i32,

    pub component_id: Uuid,

    pub component_type: ComponentType,

    pub position: i32,
}

/// Builder for creating new organization units.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub organization_number: i32,

    pub organization_name: String,

    pub municipality_id: String,

    pub communication_channels: BTreeSet<CommunicationChannel>,
}

impl NewOrganization {
    pub fn new(
        municipality_id: impl Into<String>,
        organization_number: i32,
        organization_name: impl Into<String>,
    ) -> Self {
        Self {
            organization_number,
            organization_name: organization_name.into(),
            municipality_id: municipality_id.into(),
            communication_channels: BTreeSet::from([CommunicationChannel::Email]),
        }
    }

    pub fn with_channels(
        mut self,
        channels: impl IntoIterator<Item = CommunicationChannel>,
    ) -> Self {
        self.communication_channels = channels.into_iter().collect();
        self
    }
}

/// Builder for creating new phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPhase {
    pub municipality_id: String,

    pub name: String,

    #[serde(default)]
    pub body_text: Option<String>,

    #[serde(default)]
    pub time_to_complete: Option<String>,

    pub permission: Permission,

    pub sort_order: i32,

    #[serde(default)]
    pub last_saved_by: Option<String>,
}

impl NewPhase {
    pub fn new(
        municipality_id: impl Into<String>,
        name: impl Into<String>,
        sort_order: i32,
    ) -> Self {
        Self {
            municipality_id: municipality_id.into(),
            name: name.into(),
            body_text: None,
            time_to_complete: None,
            permission: Permission::Admin,
            sort_order,
            last_saved_by: None,
        }
    }

    pub fn with_body_text(mut self, body_text: impl Into<String>) -> Self {
        self.body_text = Some(body_text.into());
        self
    }

    pub fn with_time_to_complete(mut self, duration: impl Into<String>) -> Self {
        self.time_to_complete = Some(duration.into());
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }
}

/// Builder for template tasks in a checklist definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub phase_id: Uuid,

    pub heading: String,

    #[serde(default)]
    pub heading_reference: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    pub sort_order: i32,

    pub role_type: RoleType,

    pub question_type: QuestionType,

    #[serde(default = "default_permission")]
    pub permission: Permission,
}

fn default_permission() -> Permission {
    Permission::Admin
}

impl NewTask {
    pub fn new(phase_id: Uuid, heading: impl Into<String>, sort_order: i32) -> Self {
        Self {
            phase_id,
            heading: heading.into(),
            heading_reference: None,
            text: None,
            sort_order,
            role_type: RoleType::NewEmployee,
            question_type: QuestionType::YesOrNo,
            permission: Permission::Admin,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_role_type(mut self, role_type: RoleType) -> Self {
        self.role_type = role_type;
        self
    }

    pub fn with_question_type(mut self, question_type: QuestionType) -> Self {
        self.question_type = question_type;
        self
    }

    /// Unpersisted task carrying this definition.
    pub fn into_task(self, last_saved_by: Option<String>) -> Task {
        Task {
            id: None,
            phase_id: Some(self.phase_id),
            heading: self.heading,
            heading_reference: self.heading_reference,
            text: self.text,
            sort_order: self.sort_order,
            role_type: self.role_type,
            question_type: self.question_type,
            permission: self.permission,
            created: None,
            updated: None,
            last_saved_by,
        }
    }
}

/// Builder for checklist definitions (created or imported).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChecklist {
    pub municipality_id: String,

    pub organization_number: i32,

    pub name: String,

    pub display_name: String,

    #[serde(default)]
    pub tasks: Vec<NewTask>,

    #[serde(default)]
    pub last_saved_by: Option<String>,
}

impl NewChecklist {
    pub fn new(
        municipality_id: impl Into<String>,
        organization_number: i32,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            municipality_id: municipality_id.into(),
            organization_number,
            name: name.into(),
            display_name: display_name.into(),
            tasks: Vec::new(),
            last_saved_by: None,
        }
    }

    pub fn with_task(mut self, task: NewTask) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_last_saved_by(mut self, user: impl Into<String>) -> Self {
        self.last_saved_by = Some(user.into());
        self
    }
}

/// Builder for custom tasks on an employee checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomTask {
    pub phase_id: Uuid,

    pub heading: String,

    #[serde(default)]
    pub text: Option<String>,

    pub sort_order: i32,

    pub role_type: RoleType,

    pub question_type: QuestionType,
}

impl NewCustomTask {
    pub fn new(phase_id: Uuid, heading: impl Into<String>, sort_order: i32) -> Self {
        Self {
            phase_id,
            heading: heading.into(),
            text: None,
            sort_order,
            role_type: RoleType::NewEmployee,
            question_type: QuestionType::YesOrNo,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_role_type(mut self, role_type: RoleType) -> Self {
        self.role_type = role_type;
        self
    }

    pub fn with_question_type(mut self, question_type: QuestionType) -> Self {
        self.question_type = question_type;
        self
    }
}
