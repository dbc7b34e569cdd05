//! Onboarding operations on top of a storage engine.
//!
//! `Onboarding` loads aggregates, runs the versioning, resolution,
//! fulfilment and overlay logic on them and writes the results back. Each
//! method is one request: it works on freshly loaded copies and persists
//! before returning.

use chrono::{Days, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{OnboardingError, Result};
use crate::fulfilment::{self, FulfilmentUpdate};
use crate::overlay::apply_sort_order;
use crate::resolver::{resolve_checklists, OrganizationPath};
use crate::storage::traits::StorageEngine;
use crate::storage::types::{
    Checklist, ComponentType, CustomTask, Employee, EmployeeChecklist, FulfilmentStatus,
    LifeCycle, Mentor, NewChecklist, NewCustomTask, Phase, SortOrder,
};
use crate::versioning::{clone_checklist, lifecycle, match_task_ids, repoint_fulfilments};
use crate::view::{self, ChecklistView, EmployeeChecklistView};

/// Date rules for new employee checklists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeChecklistSettings {
    /// Days from start date to end date when no end date is given
    pub default_duration_days: u64,

    /// Days after the end date until the checklist expires and gets locked
    pub expiration_grace_days: u64,
}

impl Default for EmployeeChecklistSettings {
    fn default() -> Self {
        Self {
            default_duration_days: 180,
            expiration_grace_days: 30,
        }
    }
}

/// Request to start onboarding for one employee.
#[derive(Debug, Clone)]
pub struct Initiation {
    pub municipality_id: String,
    pub employee: Employee,
    /// Employee's organizational path from the HR directory
    pub path: OrganizationPath,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub mentor: Option<Mentor>,
}

/// Result of activating a checklist version.
#[derive(Debug, Clone)]
pub struct Activation {
    pub checklist: Checklist,
    pub deprecated: Option<Checklist>,
    /// Employee checklists moved onto the activated version
    pub migrated_employee_checklists: usize,
    /// Fulfilment records re-pointed onto tasks of the activated version
    pub repointed_fulfilments: usize,
}

/// Onboarding service over a storage engine.
pub struct Onboarding<S: StorageEngine> {
    storage: S,
    settings: EmployeeChecklistSettings,
}

impl<S: StorageEngine> Onboarding<S> {
    pub fn new(storage: S) -> Self {
        Self::with_settings(storage, EmployeeChecklistSettings::default())
    }

    pub fn with_settings(storage: S, settings: EmployeeChecklistSettings) -> Self {
        Self { storage, settings }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    // --- Lookups ---

    pub fn require_checklist(&self, id: &Uuid) -> Result<Checklist> {
        self.storage
            .get_checklist(id)?
            .ok_or_else(|| OnboardingError::NotFound(format!("Checklist {}", id)))
    }

    pub fn require_employee_checklist(&self, id: &Uuid) -> Result<EmployeeChecklist> {
        self.storage
            .get_employee_checklist(id)?
            .ok_or_else(|| OnboardingError::NotFound(format!("Employee checklist {}", id)))
    }

    fn require_phase(&self, id: &Uuid) -> Result<Phase> {
        self.storage
            .get_phase(id)?
            .ok_or_else(|| OnboardingError::NotFound(format!("Phase {}", id)))
    }

    fn versions_of(&self, municipality_id: &str, name: &str) -> Result<Vec<Checklist>> {
        Ok(self
            .storage
            .list_checklists(municipality_id)?
            .into_iter()
            .filter(|checklist| checklist.name == name)
            .collect())
    }

    fn checklists_of(&self, employee_checklist: &EmployeeChecklist) -> Result<Vec<Checklist>> {
        employee_checklist
            .checklist_ids
            .iter()
            .map(|id| self.require_checklist(id))
            .collect()
    }

    // --- Checklist versions ---

    /// Import a checklist definition.
    ///
    /// A new name starts at version 1; an existing name gets the next version
    /// as a draft, provided no draft exists yet.
    pub fn import_checklist(&mut self, definition: &NewChecklist) -> Result<Checklist> {
        let organization = self
            .storage
            .get_organization(&definition.municipality_id, definition.organization_number)?
            .ok_or_else(|| {
                OnboardingError::NotFound(format!(
                    "Organization {} in municipality {}",
                    definition.organization_number, definition.municipality_id
                ))
            })?;
        for task in &definition.tasks {
            self.require_phase(&task.phase_id)?;
        }

        let versions = self.versions_of(&definition.municipality_id, &definition.name)?;
        lifecycle::ensure_no_draft(&versions)?;

        let checklist = Checklist {
            id: None,
            name: definition.name.clone(),
            display_name: definition.display_name.clone(),
            version: lifecycle::next_version(&versions),
            life_cycle: LifeCycle::Created,
            municipality_id: definition.municipality_id.clone(),
            organization_id: Some(organization.id),
            tasks: definition
                .tasks
                .iter()
                .cloned()
                .map(|task| task.into_task(definition.last_saved_by.clone()))
                .collect(),
            created: None,
            updated: None,
            last_saved_by: definition.last_saved_by.clone(),
        };

        let saved = self.storage.save_checklist(&checklist)?;
        info!(
            checklist = %saved.name,
            version = saved.version,
            tasks = saved.tasks.len(),
            "imported checklist"
        );
        Ok(saved)
    }

    /// Create the next draft version of a checklist by cloning it.
    pub fn create_new_version(&mut self, checklist_id: &Uuid, saved_by: &str) -> Result<Checklist> {
        let source = self.require_checklist(checklist_id)?;
        let versions = self.versions_of(&source.municipality_id, &source.name)?;
        lifecycle::ensure_no_draft(&versions)?;

        let mut draft = clone_checklist(&source, lifecycle::next_version(&versions))?;
        draft.last_saved_by = Some(saved_by.to_string());

        let saved = self.storage.save_checklist(&draft)?;
        let carried = self.carry_over_task_sort_orders(&source, &saved)?;
        info!(
            checklist = %saved.name,
            from_version = source.version,
            version = saved.version,
            sort_orders = carried,
            "created new checklist version"
        );
        Ok(saved)
    }

    /// Copy every organization's task positions from `from` onto the matching
    /// tasks of `to`. Phase positions need no copy since phases are shared.
    fn carry_over_task_sort_orders(&mut self, from: &Checklist, to: &Checklist) -> Result<usize> {
        let mapping = match_task_ids(Some(to.tasks.as_slice()), Some(from.tasks.as_slice()));

        let mut carried = 0;
        for (clone_id, origin_id) in &mapping {
            let overrides = self
                .storage
                .list_sort_orders_for_component(&from.municipality_id, origin_id)?;
            for sort_order in overrides
                .into_iter()
                .filter(|sort_order| sort_order.component_type == ComponentType::Task)
            {
                self.storage.save_sort_order(&SortOrder {
                    component_id: *clone_id,
                    ..sort_order
                })?;
                carried += 1;
            }
        }
        Ok(carried)
    }

    /// Save edits to a draft checklist. Name and version are fixed.
    pub fn update_draft(&mut self, checklist: &Checklist) -> Result<Checklist> {
        let id = checklist.id.ok_or_else(|| {
            OnboardingError::InvalidInput("Cannot update a checklist that has no id".to_string())
        })?;
        let stored = self.require_checklist(&id)?;
        lifecycle::ensure_draft(&stored)?;
        if stored.name != checklist.name || stored.version != checklist.version {
            return Err(OnboardingError::InvalidInput(format!(
                "Checklist {} cannot change name or version",
                id
            )));
        }
        let mut draft = checklist.clone();
        draft.life_cycle = LifeCycle::Created;
        self.storage.save_checklist(&draft)
    }

    /// Activate a draft, deprecate the previously active version and move
    /// unlocked in-flight employee checklists onto the new version.
    pub fn activate_checklist(&mut self, checklist_id: &Uuid) -> Result<Activation> {
        let mut draft = self.require_checklist(checklist_id)?;
        let mut current = self
            .versions_of(&draft.municipality_id, &draft.name)?
            .into_iter()
            .find(|checklist| checklist.life_cycle == LifeCycle::Active);

        lifecycle::activate(&mut draft, current.as_mut())?;

        if let Some(deprecated) = &current {
            self.storage.save_checklist(deprecated)?;
        }
        let activated = self.storage.save_checklist(&draft)?;

        let (migrated, repointed) = match &current {
            Some(deprecated) => self.migrate_employee_checklists(deprecated, &activated)?,
            None => (0, 0),
        };

        Ok(Activation {
            checklist: activated,
            deprecated: current,
            migrated_employee_checklists: migrated,
            repointed_fulfilments: repointed,
        })
    }

    fn migrate_employee_checklists(
        &mut self,
        from: &Checklist,
        to: &Checklist,
    ) -> Result<(usize, usize)> {
        let (Some(from_id), Some(to_id)) = (from.id, to.id) else {
            return Ok((0, 0));
        };
        let mapping = match_task_ids(Some(to.tasks.as_slice()), Some(from.tasks.as_slice()));

        let mut migrated = 0;
        let mut repointed = 0;
        let in_flight = self.storage.list_employee_checklists_for_checklist(&from_id)?;
        for mut employee_checklist in in_flight {
            if employee_checklist.locked {
                continue;
            }
            for checklist_id in employee_checklist.checklist_ids.iter_mut() {
                if *checklist_id == from_id {
                    *checklist_id = to_id;
                }
            }
            repointed += repoint_fulfilments(&mut employee_checklist.fulfilments, &mapping);
            employee_checklist.updated = Utc::now();
            self.storage.save_employee_checklist(&employee_checklist)?;
            migrated += 1;
        }

        info!(
            checklist = %to.name,
            version = to.version,
            migrated,
            repointed,
            "moved employee checklists to activated version"
        );
        Ok((migrated, repointed))
    }

    /// Delete a draft checklist.
    pub fn delete_checklist(&mut self, checklist_id: &Uuid) -> Result<()> {
        let checklist = self.require_checklist(checklist_id)?;
        lifecycle::ensure_draft(&checklist)?;
        self.storage.delete_checklist(checklist_id)?;
        info!(checklist = %checklist.name, version = checklist.version, "deleted draft checklist");
        Ok(())
    }

    /// Checklist view with the overrides of `organization_number` applied.
    pub fn checklist_view(
        &self,
        checklist_id: &Uuid,
        organization_number: Option<i32>,
    ) -> Result<ChecklistView> {
        let checklist = self.require_checklist(checklist_id)?;
        let phases = self.storage.list_phases(&checklist.municipality_id)?;
        let assembled = view::checklist_view(&checklist, &phases)?;

        let organization_number = match organization_number {
            Some(number) => Some(number),
            None => self.owning_organization_number(&checklist)?,
        };
        let overrides = match organization_number {
            Some(number) => self.storage.list_sort_orders(&checklist.municipality_id, number)?,
            None => Vec::new(),
        };
        Ok(apply_sort_order(assembled, &overrides))
    }

    fn owning_organization_number(&self, checklist: &Checklist) -> Result<Option<i32>> {
        match checklist.organization_id {
            Some(id) => Ok(self
                .storage
                .get_organization_by_id(&id)?
                .map(|organization| organization.organization_number)),
            None => Ok(None),
        }
    }

    // --- Employee checklists ---

    /// Resolve the employee's checklists and create their employee checklist.
    pub fn initiate_employee_checklist(
        &mut self,
        initiation: &Initiation,
    ) -> Result<EmployeeChecklist> {
        if self
            .storage
            .find_employee_checklist(&initiation.municipality_id, &initiation.employee.id)?
            .is_some()
        {
            return Err(OnboardingError::Conflict(format!(
                "Employee '{}' already has a checklist in municipality {}",
                initiation.employee.id, initiation.municipality_id
            )));
        }

        let checklists = resolve_checklists(
            &self.storage,
            &initiation.municipality_id,
            &initiation.employee.username,
            &initiation.path,
        )?;

        let end_date = match initiation.end_date {
            Some(end_date) => end_date,
            None => add_days(initiation.start_date, self.settings.default_duration_days)?,
        };
        if end_date < initiation.start_date {
            return Err(OnboardingError::InvalidInput(format!(
                "End date {} is before start date {}",
                end_date, initiation.start_date
            )));
        }
        let expiration_date = add_days(end_date, self.settings.expiration_grace_days)?;

        let now = Utc::now();
        let employee_checklist = EmployeeChecklist {
            id: Uuid::new_v4(),
            municipality_id: initiation.municipality_id.clone(),
            employee: initiation.employee.clone(),
            checklist_ids: checklists.iter().filter_map(|checklist| checklist.id).collect(),
            start_date: initiation.start_date,
            end_date,
            expiration_date,
            locked: false,
            mentor: initiation.mentor.clone(),
            custom_tasks: Vec::new(),
            fulfilments: Vec::new(),
            custom_fulfilments: Vec::new(),
            created: now,
            updated: now,
        };
        self.storage.save_employee_checklist(&employee_checklist)?;

        info!(
            employee = %initiation.employee.username,
            checklists = employee_checklist.checklist_ids.len(),
            "initiated employee checklist"
        );
        Ok(employee_checklist)
    }

    /// Assembled, fulfilment-decorated and re-ordered employee checklist.
    ///
    /// Overrides are taken from `organization_number`, or from the
    /// organization owning the employee checklist's first checklist.
    pub fn employee_checklist_view(
        &self,
        employee_checklist_id: &Uuid,
        organization_number: Option<i32>,
    ) -> Result<EmployeeChecklistView> {
        let employee_checklist = self.require_employee_checklist(employee_checklist_id)?;
        self.build_employee_view(&employee_checklist, organization_number)
    }

    fn build_employee_view(
        &self,
        employee_checklist: &EmployeeChecklist,
        organization_number: Option<i32>,
    ) -> Result<EmployeeChecklistView> {
        let checklists = self.checklists_of(employee_checklist)?;
        let phases = self.storage.list_phases(&employee_checklist.municipality_id)?;
        let assembled = view::employee_checklist_view(employee_checklist, &checklists, &phases)?;
        let decorated = fulfilment::aggregate_fulfilment(assembled, employee_checklist);

        let organization_number = match organization_number {
            Some(number) => Some(number),
            None => match checklists.first() {
                Some(checklist) => self.owning_organization_number(checklist)?,
                None => None,
            },
        };
        let overrides = match organization_number {
            Some(number) => self
                .storage
                .list_sort_orders(&employee_checklist.municipality_id, number)?,
            None => Vec::new(),
        };
        Ok(apply_sort_order(decorated, &overrides))
    }

    /// Set the fulfilment of one task (common or custom).
    ///
    /// Unlike [`Self::update_phase_fulfilment`], this path does not refuse
    /// locked employee checklists.
    pub fn update_task_fulfilment(
        &mut self,
        employee_checklist_id: &Uuid,
        task_id: &Uuid,
        update: &FulfilmentUpdate,
    ) -> Result<FulfilmentStatus> {
        let mut employee_checklist = self.require_employee_checklist(employee_checklist_id)?;

        if employee_checklist.find_custom_task(task_id).is_some() {
            fulfilment::upsert_custom_fulfilment(&mut employee_checklist, *task_id, update);
        } else {
            let checklists = self.checklists_of(&employee_checklist)?;
            if !checklists.iter().any(|checklist| checklist.find_task(task_id).is_some()) {
                return Err(OnboardingError::NotFound(format!(
                    "Task {} in employee checklist {}",
                    task_id, employee_checklist_id
                )));
            }
            fulfilment::upsert_fulfilment(&mut employee_checklist, *task_id, update);
        }

        employee_checklist.updated = Utc::now();
        self.storage.save_employee_checklist(&employee_checklist)?;
        Ok(update.status)
    }

    /// Set the fulfilment of every task in one phase.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::Locked` if the employee checklist is locked and
    /// `OnboardingError::NotFound` if the phase has no tasks in it.
    pub fn update_phase_fulfilment(
        &mut self,
        employee_checklist_id: &Uuid,
        phase_id: &Uuid,
        update: &FulfilmentUpdate,
    ) -> Result<usize> {
        let mut employee_checklist = self.require_employee_checklist(employee_checklist_id)?;
        let assembled = self.build_employee_view(&employee_checklist, None)?;
        let phase = assembled
            .phases
            .iter()
            .find(|phase| phase.id == *phase_id)
            .ok_or_else(|| {
                OnboardingError::NotFound(format!(
                    "Phase {} in employee checklist {}",
                    phase_id, employee_checklist_id
                ))
            })?;

        let updated = fulfilment::fulfil_phase(&mut employee_checklist, phase, update)?;
        employee_checklist.updated = Utc::now();
        self.storage.save_employee_checklist(&employee_checklist)?;
        Ok(updated)
    }

    /// Add a task to one employee checklist.
    pub fn add_custom_task(
        &mut self,
        employee_checklist_id: &Uuid,
        task: &NewCustomTask,
        saved_by: &str,
    ) -> Result<CustomTask> {
        let mut employee_checklist = self.require_employee_checklist(employee_checklist_id)?;
        ensure_unlocked(&employee_checklist)?;
        self.require_phase(&task.phase_id)?;

        let now = Utc::now();
        let custom_task = CustomTask {
            id: Uuid::new_v4(),
            phase_id: task.phase_id,
            heading: task.heading.clone(),
            text: task.text.clone(),
            sort_order: task.sort_order,
            role_type: task.role_type,
            question_type: task.question_type,
            created: now,
            updated: now,
            last_saved_by: Some(saved_by.to_string()),
        };
        employee_checklist.custom_tasks.push(custom_task.clone());
        employee_checklist.updated = now;
        self.storage.save_employee_checklist(&employee_checklist)?;
        Ok(custom_task)
    }

    /// Replace the content of a custom task.
    pub fn update_custom_task(
        &mut self,
        employee_checklist_id: &Uuid,
        custom_task_id: &Uuid,
        task: &NewCustomTask,
        saved_by: &str,
    ) -> Result<CustomTask> {
        let mut employee_checklist = self.require_employee_checklist(employee_checklist_id)?;
        ensure_unlocked(&employee_checklist)?;
        self.require_phase(&task.phase_id)?;

        let now = Utc::now();
        let existing = employee_checklist
            .custom_tasks
            .iter_mut()
            .find(|custom| custom.id == *custom_task_id)
            .ok_or_else(|| OnboardingError::NotFound(format!("Custom task {}", custom_task_id)))?;
        existing.phase_id = task.phase_id;
        existing.heading = task.heading.clone();
        existing.text = task.text.clone();
        existing.sort_order = task.sort_order;
        existing.role_type = task.role_type;
        existing.question_type = task.question_type;
        existing.updated = now;
        existing.last_saved_by = Some(saved_by.to_string());
        let updated = existing.clone();

        employee_checklist.updated = now;
        self.storage.save_employee_checklist(&employee_checklist)?;
        Ok(updated)
    }

    /// Remove a custom task and its fulfilment record.
    pub fn delete_custom_task(
        &mut self,
        employee_checklist_id: &Uuid,
        custom_task_id: &Uuid,
    ) -> Result<()> {
        let mut employee_checklist = self.require_employee_checklist(employee_checklist_id)?;
        ensure_unlocked(&employee_checklist)?;

        let before = employee_checklist.custom_tasks.len();
        employee_checklist
            .custom_tasks
            .retain(|custom| custom.id != *custom_task_id);
        if employee_checklist.custom_tasks.len() == before {
            return Err(OnboardingError::NotFound(format!("Custom task {}", custom_task_id)));
        }
        employee_checklist
            .custom_fulfilments
            .retain(|record| record.custom_task_id != *custom_task_id);

        employee_checklist.updated = Utc::now();
        self.storage.save_employee_checklist(&employee_checklist)
    }

    /// Set or clear the mentor.
    pub fn set_mentor(
        &mut self,
        employee_checklist_id: &Uuid,
        mentor: Option<Mentor>,
    ) -> Result<()> {
        let mut employee_checklist = self.require_employee_checklist(employee_checklist_id)?;
        employee_checklist.mentor = mentor;
        employee_checklist.updated = Utc::now();
        self.storage.save_employee_checklist(&employee_checklist)
    }

    /// Lock every employee checklist whose expiration date is before `today`.
    pub fn lock_expired(&mut self, municipality_id: &str, today: NaiveDate) -> Result<usize> {
        let mut locked = 0;
        for mut employee_checklist in self.storage.list_employee_checklists(municipality_id)? {
            if employee_checklist.locked || employee_checklist.expiration_date >= today {
                continue;
            }
            employee_checklist.locked = true;
            employee_checklist.updated = Utc::now();
            self.storage.save_employee_checklist(&employee_checklist)?;
            locked += 1;
        }
        info!(municipality = municipality_id, locked, "locked expired employee checklists");
        Ok(locked)
    }

    pub fn delete_employee_checklist(&mut self, employee_checklist_id: &Uuid) -> Result<()> {
        self.storage.delete_employee_checklist(employee_checklist_id)
    }

    // --- Sort order ---

    /// Store an organization's position for a phase or task.
    ///
    /// The organization must be registered in the municipality, and the
    /// component must be a phase or a task of one of its checklists.
    pub fn set_sort_order(&mut self, sort_order: &SortOrder) -> Result<()> {
        let municipality_id = &sort_order.municipality_id;
        if self
            .storage
            .get_organization(municipality_id, sort_order.organization_number)?
            .is_none()
        {
            return Err(OnboardingError::NotFound(format!(
                "Organization {} in municipality {}",
                sort_order.organization_number, municipality_id
            )));
        }

        match sort_order.component_type {
            ComponentType::Phase => {
                self.require_phase(&sort_order.component_id)?;
            }
            ComponentType::Task => {
                let known = self
                    .storage
                    .list_checklists(municipality_id)?
                    .iter()
                    .any(|checklist| checklist.find_task(&sort_order.component_id).is_some());
                if !known {
                    return Err(OnboardingError::NotFound(format!(
                        "Task {} in municipality {}",
                        sort_order.component_id, municipality_id
                    )));
                }
            }
        }
        self.storage.save_sort_order(sort_order)
    }
}

fn ensure_unlocked(employee_checklist: &EmployeeChecklist) -> Result<()> {
    if employee_checklist.locked {
        return Err(OnboardingError::Locked(employee_checklist.id.to_string()));
    }
    Ok(())
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days)).ok_or_else(|| {
        OnboardingError::InvalidInput(format!("Date {} + {} days is out of range", date, days))
    })
}
