//! Read models served to clients.
//!
//! Views group tasks under their phases. They are assembled from stored
//! checklists, decorated with fulfilment state and re-ordered by sort-order
//! overrides before being returned; nothing in a view is written back.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{OnboardingError, Result};
use crate::overlay::sort_phases;
use crate::storage::types::{
    Checklist, CustomTask, Employee, EmployeeChecklist, FulfilmentStatus, LifeCycle, Mentor,
    Permission, Phase, QuestionType, RoleType, Task,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: Uuid,
    pub heading: String,
    pub heading_reference: Option<String>,
    pub text: Option<String>,
    pub sort_order: i32,
    pub role_type: RoleType,
    pub question_type: QuestionType,
    pub permission: Permission,
    /// Set for tasks that belong to a single employee checklist
    pub custom: bool,
    pub fulfilment_status: FulfilmentStatus,
    pub response_text: Option<String>,
    pub last_saved_by: Option<String>,
    pub updated: Option<DateTime<Utc>>,
}

impl TaskView {
    fn common(task: &Task) -> Result<Self> {
        let id = task.id.ok_or_else(|| {
            OnboardingError::InvalidInput(format!("Task '{}' has not been saved", task.heading))
        })?;
        Ok(Self {
            id,
            heading: task.heading.clone(),
            heading_reference: task.heading_reference.clone(),
            text: task.text.clone(),
            sort_order: task.sort_order,
            role_type: task.role_type,
            question_type: task.question_type,
            permission: task.permission,
            custom: false,
            fulfilment_status: FulfilmentStatus::Empty,
            response_text: None,
            last_saved_by: None,
            updated: None,
        })
    }

    fn custom(task: &CustomTask) -> Self {
        Self {
            id: task.id,
            heading: task.heading.clone(),
            heading_reference: None,
            text: task.text.clone(),
            sort_order: task.sort_order,
            role_type: task.role_type,
            question_type: task.question_type,
            permission: Permission::Admin,
            custom: true,
            fulfilment_status: FulfilmentStatus::Empty,
            response_text: None,
            last_saved_by: None,
            updated: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseView {
    pub id: Uuid,
    pub name: String,
    pub body_text: Option<String>,
    pub time_to_complete: Option<String>,
    pub permission: Permission,
    pub sort_order: i32,
    pub tasks: Vec<TaskView>,
}

impl PhaseView {
    fn from_phase(phase: &Phase) -> Self {
        Self {
            id: phase.id,
            name: phase.name.clone(),
            body_text: phase.body_text.clone(),
            time_to_complete: phase.time_to_complete.clone(),
            permission: phase.permission,
            sort_order: phase.sort_order,
            tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistView {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub version: i32,
    pub life_cycle: LifeCycle,
    pub phases: Vec<PhaseView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeChecklistView {
    pub id: Uuid,
    pub employee: Employee,
    pub checklist_ids: Vec<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub locked: bool,
    pub mentor: Option<Mentor>,
    /// Every task answered (TRUE or FALSE)
    pub completed: bool,
    pub phases: Vec<PhaseView>,
}

/// Groups tasks under phases in first-seen order.
struct PhaseGrouping<'a> {
    phases: HashMap<Uuid, &'a Phase>,
    order: Vec<Uuid>,
    grouped: HashMap<Uuid, PhaseView>,
}

impl<'a> PhaseGrouping<'a> {
    fn new(phases: &'a [Phase]) -> Self {
        Self {
            phases: phases.iter().map(|phase| (phase.id, phase)).collect(),
            order: Vec::new(),
            grouped: HashMap::new(),
        }
    }

    fn push(&mut self, phase_id: Uuid, task: TaskView) -> Result<()> {
        if !self.grouped.contains_key(&phase_id) {
            let phase = self.phases.get(&phase_id).ok_or_else(|| {
                OnboardingError::NotFound(format!(
                    "Phase {} referenced by task {}",
                    phase_id, task.id
                ))
            })?;
            self.grouped.insert(phase_id, PhaseView::from_phase(phase));
            self.order.push(phase_id);
        }
        if let Some(view) = self.grouped.get_mut(&phase_id) {
            view.tasks.push(task);
        }
        Ok(())
    }

    fn push_common(&mut self, task: &Task) -> Result<()> {
        let phase_id = task.phase_id.ok_or_else(|| {
            OnboardingError::InvalidInput(format!("Task '{}' has no phase", task.heading))
        })?;
        self.push(phase_id, TaskView::common(task)?)
    }

    fn finish(mut self) -> Vec<PhaseView> {
        let mut phases: Vec<PhaseView> = self
            .order
            .iter()
            .filter_map(|id| self.grouped.remove(id))
            .collect();
        sort_phases(&mut phases);
        phases
    }
}

/// Assemble the phase/task view of a checklist.
///
/// # Errors
///
/// Fails if the checklist or a task is unsaved, or a task references a
/// phase missing from `phases`.
pub fn checklist_view(checklist: &Checklist, phases: &[Phase]) -> Result<ChecklistView> {
    let id = checklist.id.ok_or_else(|| {
        OnboardingError::InvalidInput(format!("Checklist '{}' has not been saved", checklist.name))
    })?;

    let mut grouping = PhaseGrouping::new(phases);
    for task in &checklist.tasks {
        grouping.push_common(task)?;
    }

    Ok(ChecklistView {
        id,
        name: checklist.name.clone(),
        display_name: checklist.display_name.clone(),
        version: checklist.version,
        life_cycle: checklist.life_cycle,
        phases: grouping.finish(),
    })
}

/// Assemble the view of an employee checklist: the common tasks of every
/// referenced checklist plus the instance's custom tasks, all unanswered.
///
/// Fulfilment state is attached separately by
/// [`aggregate_fulfilment`](crate::fulfilment::aggregate_fulfilment).
pub fn employee_checklist_view(
    employee_checklist: &EmployeeChecklist,
    checklists: &[Checklist],
    phases: &[Phase],
) -> Result<EmployeeChecklistView> {
    let mut grouping = PhaseGrouping::new(phases);
    for checklist in checklists {
        for task in &checklist.tasks {
            grouping.push_common(task)?;
        }
    }
    for task in &employee_checklist.custom_tasks {
        grouping.push(task.phase_id, TaskView::custom(task))?;
    }

    Ok(EmployeeChecklistView {
        id: employee_checklist.id,
        employee: employee_checklist.employee.clone(),
        checklist_ids: employee_checklist.checklist_ids.clone(),
        start_date: employee_checklist.start_date,
        end_date: employee_checklist.end_date,
        expiration_date: employee_checklist.expiration_date,
        locked: employee_checklist.locked,
        mentor: employee_checklist.mentor.clone(),
        completed: false,
        phases: grouping.finish(),
    })
}
