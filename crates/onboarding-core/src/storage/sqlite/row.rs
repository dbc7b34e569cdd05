//! Row types for database queries.
//!
//! Rows hold raw column text; conversion into domain types validates ids,
//! timestamps and enum names and reports corruption as a storage error.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::error::{OnboardingError, Result};
use crate::storage::types::{
    CommunicationChannel, CustomFulfilment, CustomTask, Employee, Fulfilment, Mentor,
    OrganizationUnit, Phase, SortOrder, Task,
};

pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| OnboardingError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| OnboardingError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

pub(crate) fn parse_optional_timestamp(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value.map(parse_timestamp).transpose()
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| OnboardingError::Storage(format!("Invalid date '{}': {}", value, e)))
}

pub(crate) fn parse_stored<T>(value: &str) -> Result<T>
where
    T: FromStr<Err = OnboardingError>,
{
    value
        .parse()
        .map_err(|e: OnboardingError| OnboardingError::Storage(e.to_string()))
}

/// Raw row data from the organizations table.
#[derive(Debug)]
pub struct OrganizationRow {
    pub id: String,
    pub municipality_id: String,
    pub organization_number: i32,
    pub organization_name: String,
    pub communication_channels: String,
    pub created: String,
    pub updated: String,
}

impl OrganizationRow {
    pub const COLUMNS: &'static str = "id, municipality_id, organization_number, \
         organization_name, communication_channels, created, updated";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            municipality_id: row.get(1)?,
            organization_number: row.get(2)?,
            organization_name: row.get(3)?,
            communication_channels: row.get(4)?,
            created: row.get(5)?,
            updated: row.get(6)?,
        })
    }
}

impl TryFrom<OrganizationRow> for OrganizationUnit {
    type Error = OnboardingError;

    fn try_from(row: OrganizationRow) -> Result<Self> {
        let communication_channels = row
            .communication_channels
            .split(',')
            .filter(|value| !value.is_empty())
            .map(parse_stored::<CommunicationChannel>)
            .collect::<Result<BTreeSet<_>>>()?;

        Ok(OrganizationUnit {
            id: parse_uuid(&row.id, "organization")?,
            organization_number: row.organization_number,
            organization_name: row.organization_name,
            municipality_id: row.municipality_id,
            communication_channels,
            created: parse_timestamp(&row.created)?,
            updated: parse_timestamp(&row.updated)?,
        })
    }
}

/// Raw row data from the phases table.
#[derive(Debug)]
pub struct PhaseRow {
    pub id: String,
    pub municipality_id: String,
    pub name: String,
    pub body_text: Option<String>,
    pub time_to_complete: Option<String>,
    pub permission: String,
    pub sort_order: i32,
    pub created: String,
    pub updated: String,
    pub last_saved_by: Option<String>,
}

impl PhaseRow {
    pub const COLUMNS: &'static str = "id, municipality_id, name, body_text, time_to_complete, \
         permission, sort_order, created, updated, last_saved_by";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            municipality_id: row.get(1)?,
            name: row.get(2)?,
            body_text: row.get(3)?,
            time_to_complete: row.get(4)?,
            permission: row.get(5)?,
            sort_order: row.get(6)?,
            created: row.get(7)?,
            updated: row.get(8)?,
            last_saved_by: row.get(9)?,
        })
    }
}

impl TryFrom<PhaseRow> for Phase {
    type Error = OnboardingError;

    fn try_from(row: PhaseRow) -> Result<Self> {
        Ok(Phase {
            id: parse_uuid(&row.id, "phase")?,
            municipality_id: row.municipality_id,
            name: row.name,
            body_text: row.body_text,
            time_to_complete: row.time_to_complete,
            permission: parse_stored(&row.permission)?,
            sort_order: row.sort_order,
            created: parse_timestamp(&row.created)?,
            updated: parse_timestamp(&row.updated)?,
            last_saved_by: row.last_saved_by,
        })
    }
}

/// Raw row data from the checklists table (tasks are loaded separately).
#[derive(Debug)]
pub struct ChecklistRow {
    pub id: String,
    pub municipality_id: String,
    pub organization_id: Option<String>,
    pub name: String,
    pub display_name: String,
    pub version: i32,
    pub life_cycle: String,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub last_saved_by: Option<String>,
}

impl ChecklistRow {
    pub const COLUMNS: &'static str = "id, municipality_id, organization_id, name, display_name, \
         version, life_cycle, created, updated, last_saved_by";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            municipality_id: row.get(1)?,
            organization_id: row.get(2)?,
            name: row.get(3)?,
            display_name: row.get(4)?,
            version: row.get(5)?,
            life_cycle: row.get(6)?,
            created: row.get(7)?,
            updated: row.get(8)?,
            last_saved_by: row.get(9)?,
        })
    }
}

/// Raw row data from the tasks table.
#[derive(Debug)]
pub struct TaskRow {
    pub id: String,
    pub phase_id: Option<String>,
    pub heading: String,
    pub heading_reference: Option<String>,
    pub text: Option<String>,
    pub sort_order: i32,
    pub role_type: String,
    pub question_type: String,
    pub permission: String,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub last_saved_by: Option<String>,
}

impl TaskRow {
    pub const COLUMNS: &'static str = "id, phase_id, heading, heading_reference, text, sort_order, \
         role_type, question_type, permission, created, updated, last_saved_by";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            phase_id: row.get(1)?,
            heading: row.get(2)?,
            heading_reference: row.get(3)?,
            text: row.get(4)?,
            sort_order: row.get(5)?,
            role_type: row.get(6)?,
            question_type: row.get(7)?,
            permission: row.get(8)?,
            created: row.get(9)?,
            updated: row.get(10)?,
            last_saved_by: row.get(11)?,
        })
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = OnboardingError;

    fn try_from(row: TaskRow) -> Result<Self> {
        Ok(Task {
            id: Some(parse_uuid(&row.id, "task")?),
            phase_id: row
                .phase_id
                .as_deref()
                .map(|id| parse_uuid(id, "phase"))
                .transpose()?,
            heading: row.heading,
            heading_reference: row.heading_reference,
            text: row.text,
            sort_order: row.sort_order,
            role_type: parse_stored(&row.role_type)?,
            question_type: parse_stored(&row.question_type)?,
            permission: parse_stored(&row.permission)?,
            created: parse_optional_timestamp(row.created.as_deref())?,
            updated: parse_optional_timestamp(row.updated.as_deref())?,
            last_saved_by: row.last_saved_by,
        })
    }
}

/// Raw row data from the employee_checklists table.
#[derive(Debug)]
pub struct EmployeeChecklistRow {
    pub id: String,
    pub municipality_id: String,
    pub employee_json: String,
    pub start_date: String,
    pub end_date: String,
    pub expiration_date: String,
    pub locked: bool,
    pub mentor_json: Option<String>,
    pub created: String,
    pub updated: String,
}

impl EmployeeChecklistRow {
    pub const COLUMNS: &'static str = "id, municipality_id, employee_json, start_date, end_date, \
         expiration_date, locked, mentor_json, created, updated";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            municipality_id: row.get(1)?,
            employee_json: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
            expiration_date: row.get(5)?,
            locked: row.get(6)?,
            mentor_json: row.get(7)?,
            created: row.get(8)?,
            updated: row.get(9)?,
        })
    }

    pub fn employee(&self) -> Result<Employee> {
        serde_json::from_str(&self.employee_json)
            .map_err(|e| OnboardingError::Storage(format!("Invalid employee JSON: {}", e)))
    }

    pub fn mentor(&self) -> Result<Option<Mentor>> {
        self.mentor_json
            .as_deref()
            .map(|value| {
                serde_json::from_str(value)
                    .map_err(|e| OnboardingError::Storage(format!("Invalid mentor JSON: {}", e)))
            })
            .transpose()
    }
}

/// Raw row data from the custom_tasks table.
#[derive(Debug)]
pub struct CustomTaskRow {
    pub id: String,
    pub phase_id: String,
    pub heading: String,
    pub text: Option<String>,
    pub sort_order: i32,
    pub role_type: String,
    pub question_type: String,
    pub created: String,
    pub updated: String,
    pub last_saved_by: Option<String>,
}

impl CustomTaskRow {
    pub const COLUMNS: &'static str = "id, phase_id, heading, text, sort_order, role_type, \
         question_type, created, updated, last_saved_by";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            phase_id: row.get(1)?,
            heading: row.get(2)?,
            text: row.get(3)?,
            sort_order: row.get(4)?,
            role_type: row.get(5)?,
            question_type: row.get(6)?,
            created: row.get(7)?,
            updated: row.get(8)?,
            last_saved_by: row.get(9)?,
        })
    }
}

impl TryFrom<CustomTaskRow> for CustomTask {
    type Error = OnboardingError;

    fn try_from(row: CustomTaskRow) -> Result<Self> {
        Ok(CustomTask {
            id: parse_uuid(&row.id, "custom task")?,
            phase_id: parse_uuid(&row.phase_id, "phase")?,
            heading: row.heading,
            text: row.text,
            sort_order: row.sort_order,
            role_type: parse_stored(&row.role_type)?,
            question_type: parse_stored(&row.question_type)?,
            created: parse_timestamp(&row.created)?,
            updated: parse_timestamp(&row.updated)?,
            last_saved_by: row.last_saved_by,
        })
    }
}

/// Raw row data shared by the fulfilments and custom_fulfilments tables.
#[derive(Debug)]
pub struct FulfilmentRow {
    pub task_id: String,
    pub status: String,
    pub response_text: Option<String>,
    pub last_saved_by: String,
    pub updated: String,
}

impl FulfilmentRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            task_id: row.get(0)?,
            status: row.get(1)?,
            response_text: row.get(2)?,
            last_saved_by: row.get(3)?,
            updated: row.get(4)?,
        })
    }
}

impl TryFrom<FulfilmentRow> for Fulfilment {
    type Error = OnboardingError;

    fn try_from(row: FulfilmentRow) -> Result<Self> {
        Ok(Fulfilment {
            task_id: parse_uuid(&row.task_id, "task")?,
            status: parse_stored(&row.status)?,
            response_text: row.response_text,
            last_saved_by: row.last_saved_by,
            updated: parse_timestamp(&row.updated)?,
        })
    }
}

impl TryFrom<FulfilmentRow> for CustomFulfilment {
    type Error = OnboardingError;

    fn try_from(row: FulfilmentRow) -> Result<Self> {
        Ok(CustomFulfilment {
            custom_task_id: parse_uuid(&row.task_id, "custom task")?,
            status: parse_stored(&row.status)?,
            response_text: row.response_text,
            last_saved_by: row.last_saved_by,
            updated: parse_timestamp(&row.updated)?,
        })
    }
}

/// Raw row data from the sort_orders table.
#[derive(Debug)]
pub struct SortOrderRow {
    pub municipality_id: String,
    pub organization_number: i32,
    pub component_id: String,
    pub component_type: String,
    pub position: i32,
}

impl SortOrderRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            municipality_id: row.get(0)?,
            organization_number: row.get(1)?,
            component_id: row.get(2)?,
            component_type: row.get(3)?,
            position: row.get(4)?,
        })
    }
}

impl TryFrom<SortOrderRow> for SortOrder {
    type Error = OnboardingError;

    fn try_from(row: SortOrderRow) -> Result<Self> {
        Ok(SortOrder {
            municipality_id: row.municipality_id,
            organization_number: row.organization_number,
            component_id: parse_uuid(&row.component_id, "component")?,
            component_type: parse_stored(&row.component_type)?,
            position: row.position,
        })
    }
}
