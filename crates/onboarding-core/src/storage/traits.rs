//! Storage engine trait definition.
//!
//! The core decides *what* to persist; a `StorageEngine` decides *how*.
//! The onboarding engine only talks to storage through this trait.

use uuid::Uuid;

use super::types::{
    Checklist, EmployeeChecklist, NewOrganization, NewPhase, OrganizationUnit, Phase, SortOrder,
};
use crate::error::Result;

/// Storage engine interface for onboarding data.
///
/// All implementations must ensure:
/// - Saving an aggregate (checklist with tasks, employee checklist with custom
///   tasks and fulfilments) is atomic
/// - UUIDs are used for all identifiers
/// - Organization numbers are unique per municipality
pub trait StorageEngine {
    // --- Organization operations ---

    /// Create a new organization unit.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::Conflict` if the organization number already
    /// exists in the municipality.
    fn create_organization(&mut self, organization: &NewOrganization) -> Result<Uuid>;

    /// Get an organization unit by municipality and organization number.
    fn get_organization(
        &self,
        municipality_id: &str,
        organization_number: i32,
    ) -> Result<Option<OrganizationUnit>>;

    /// Get an organization unit by id.
    fn get_organization_by_id(&self, id: &Uuid) -> Result<Option<OrganizationUnit>>;

    /// List organization units in a municipality, ordered by organization number.
    fn list_organizations(&self, municipality_id: &str) -> Result<Vec<OrganizationUnit>>;

    // --- Phase operations ---

    fn create_phase(&mut self, phase: &NewPhase) -> Result<Uuid>;

    fn get_phase(&self, id: &Uuid) -> Result<Option<Phase>>;

    /// List phases in a municipality.
    fn list_phases(&self, municipality_id: &str) -> Result<Vec<Phase>>;

    // --- Checklist operations ---

    /// Insert or update a checklist together with its tasks.
    ///
    /// A checklist or task without an id is inserted with a freshly generated
    /// id and `created`/`updated` set to now. Tasks previously stored for the
    /// checklist but absent from `checklist.tasks` are removed.
    ///
    /// # Returns
    ///
    /// Returns the checklist as stored, with every id assigned.
    fn save_checklist(&mut self, checklist: &Checklist) -> Result<Checklist>;

    fn get_checklist(&self, id: &Uuid) -> Result<Option<Checklist>>;

    /// List every version of every checklist in a municipality,
    /// ordered by name then version.
    fn list_checklists(&self, municipality_id: &str) -> Result<Vec<Checklist>>;

    /// List checklists attached to an organization unit.
    fn list_checklists_for_organization(&self, organization_id: &Uuid) -> Result<Vec<Checklist>>;

    /// Delete a checklist and its tasks.
    fn delete_checklist(&mut self, id: &Uuid) -> Result<()>;

    // --- Employee checklist operations ---

    /// Insert or replace an employee checklist with its custom tasks and
    /// fulfilment records.
    fn save_employee_checklist(&mut self, employee_checklist: &EmployeeChecklist) -> Result<()>;

    fn get_employee_checklist(&self, id: &Uuid) -> Result<Option<EmployeeChecklist>>;

    /// Find the employee checklist of an employee in a municipality.
    fn find_employee_checklist(
        &self,
        municipality_id: &str,
        employee_id: &str,
    ) -> Result<Option<EmployeeChecklist>>;

    /// List employee checklists in a municipality.
    fn list_employee_checklists(&self, municipality_id: &str) -> Result<Vec<EmployeeChecklist>>;

    /// List employee checklists referencing a checklist.
    fn list_employee_checklists_for_checklist(
        &self,
        checklist_id: &Uuid,
    ) -> Result<Vec<EmployeeChecklist>>;

    fn delete_employee_checklist(&mut self, id: &Uuid) -> Result<()>;

    // --- Sort order operations ---

    /// Insert or replace the override keyed by
    /// (municipality, organization number, component id).
    fn save_sort_order(&mut self, sort_order: &SortOrder) -> Result<()>;

    /// List overrides for one organization.
    fn list_sort_orders(
        &self,
        municipality_id: &str,
        organization_number: i32,
    ) -> Result<Vec<SortOrder>>;

    /// List every organization's override for one phase or task.
    fn list_sort_orders_for_component(
        &self,
        municipality_id: &str,
        component_id: &Uuid,
    ) -> Result<Vec<SortOrder>>;
}
