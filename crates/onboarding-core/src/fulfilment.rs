//! Fulfilment tracking for employee checklists.
//!
//! Common tasks and custom tasks keep separate fulfilment collections. A
//! view task's `custom` flag decides which collection it is matched against;
//! ids are never compared across the two.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{OnboardingError, Result};
use crate::storage::types::{CustomFulfilment, EmployeeChecklist, Fulfilment, FulfilmentStatus};
use crate::view::{EmployeeChecklistView, PhaseView, TaskView};

/// New fulfilment state for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct FulfilmentUpdate {
    pub status: FulfilmentStatus,
    pub response_text: Option<String>,
    pub saved_by: String,
}

impl FulfilmentUpdate {
    pub fn new(status: FulfilmentStatus, saved_by: impl Into<String>) -> Self {
        Self {
            status,
            response_text: None,
            saved_by: saved_by.into(),
        }
    }

    pub fn with_response_text(mut self, response_text: impl Into<String>) -> Self {
        self.response_text = Some(response_text.into());
        self
    }
}

fn decorate(
    task: &mut TaskView,
    status: FulfilmentStatus,
    response_text: &Option<String>,
    saved_by: &str,
    updated: chrono::DateTime<Utc>,
) {
    task.fulfilment_status = status;
    task.response_text = response_text.clone();
    task.last_saved_by = Some(saved_by.to_string());
    task.updated = Some(updated);
}

/// True iff every task in every phase is answered (TRUE or FALSE).
pub fn is_completed(phases: &[PhaseView]) -> bool {
    phases
        .iter()
        .flat_map(|phase| phase.tasks.iter())
        .all(|task| task.fulfilment_status.is_answered())
}

/// Attach fulfilment records to the view's tasks and compute `completed`.
///
/// Records are matched by exact task id. Tasks without a record keep their
/// current state.
pub fn aggregate_fulfilment(
    mut view: EmployeeChecklistView,
    employee_checklist: &EmployeeChecklist,
) -> EmployeeChecklistView {
    let common: HashMap<Uuid, &Fulfilment> = employee_checklist
        .fulfilments
        .iter()
        .map(|f| (f.task_id, f))
        .collect();
    let custom: HashMap<Uuid, &CustomFulfilment> = employee_checklist
        .custom_fulfilments
        .iter()
        .map(|f| (f.custom_task_id, f))
        .collect();

    for task in view.phases.iter_mut().flat_map(|phase| phase.tasks.iter_mut()) {
        if task.custom {
            if let Some(record) = custom.get(&task.id) {
                decorate(
                    task,
                    record.status,
                    &record.response_text,
                    &record.last_saved_by,
                    record.updated,
                );
            }
        } else if let Some(record) = common.get(&task.id) {
            decorate(
                task,
                record.status,
                &record.response_text,
                &record.last_saved_by,
                record.updated,
            );
        }
    }

    view.completed = is_completed(&view.phases);
    debug!(
        employee_checklist = %view.id,
        completed = view.completed,
        "aggregated fulfilment"
    );
    view
}

/// Insert or update the fulfilment of a common task.
///
/// Locked employee checklists are not checked here; see
/// [`fulfil_phase`] for the path that enforces the lock.
pub fn upsert_fulfilment(
    employee_checklist: &mut EmployeeChecklist,
    task_id: Uuid,
    update: &FulfilmentUpdate,
) -> Fulfilment {
    let now = Utc::now();
    match employee_checklist
        .fulfilments
        .iter_mut()
        .find(|f| f.task_id == task_id)
    {
        Some(existing) => {
            existing.status = update.status;
            existing.response_text = update.response_text.clone();
            existing.last_saved_by = update.saved_by.clone();
            existing.updated = now;
            existing.clone()
        }
        None => {
            let record = Fulfilment {
                task_id,
                status: update.status,
                response_text: update.response_text.clone(),
                last_saved_by: update.saved_by.clone(),
                updated: now,
            };
            employee_checklist.fulfilments.push(record.clone());
            record
        }
    }
}

/// Insert or update the fulfilment of a custom task.
pub fn upsert_custom_fulfilment(
    employee_checklist: &mut EmployeeChecklist,
    custom_task_id: Uuid,
    update: &FulfilmentUpdate,
) -> CustomFulfilment {
    let now = Utc::now();
    match employee_checklist
        .custom_fulfilments
        .iter_mut()
        .find(|f| f.custom_task_id == custom_task_id)
    {
        Some(existing) => {
            existing.status = update.status;
            existing.response_text = update.response_text.clone();
            existing.last_saved_by = update.saved_by.clone();
            existing.updated = now;
            existing.clone()
        }
        None => {
            let record = CustomFulfilment {
                custom_task_id,
                status: update.status,
                response_text: update.response_text.clone(),
                last_saved_by: update.saved_by.clone(),
                updated: now,
            };
            employee_checklist.custom_fulfilments.push(record.clone());
            record
        }
    }
}

/// Fulfil every task of one phase at once.
///
/// `phase` is the assembled phase of this employee checklist; each task is
/// upserted into the collection its `custom` flag selects. Returns the number
/// of tasks updated.
///
/// # Errors
///
/// Returns `OnboardingError::Locked` if the employee checklist is locked.
pub fn fulfil_phase(
    employee_checklist: &mut EmployeeChecklist,
    phase: &PhaseView,
    update: &FulfilmentUpdate,
) -> Result<usize> {
    if employee_checklist.locked {
        warn!(
            employee_checklist = %employee_checklist.id,
            phase = %phase.id,
            "rejected phase fulfilment on locked employee checklist"
        );
        return Err(OnboardingError::Locked(employee_checklist.id.to_string()));
    }

    for task in &phase.tasks {
        if task.custom {
            upsert_custom_fulfilment(employee_checklist, task.id, update);
        } else {
            upsert_fulfilment(employee_checklist, task.id, update);
        }
    }
    Ok(phase.tasks.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::{Employee, Permission, QuestionType, RoleType};
    use chrono::NaiveDate;

    fn task(custom: bool) -> TaskView {
        TaskView {
            id: Uuid::new_v4(),
            heading: "Task".to_string(),
            heading_reference: None,
            text: None,
            sort_order: 1,
            role_type: RoleType::NewEmployee,
            question_type: QuestionType::YesOrNo,
            permission: Permission::Admin,
            custom,
            fulfilment_status: FulfilmentStatus::Empty,
            response_text: None,
            last_saved_by: None,
            updated: None,
        }
    }

    fn phase(tasks: Vec<TaskView>) -> PhaseView {
        PhaseView {
            id: Uuid::new_v4(),
            name: "First day".to_string(),
            body_text: None,
            time_to_complete: None,
            permission: Permission::Admin,
            sort_order: 1,
            tasks,
        }
    }

    fn employee_checklist() -> EmployeeChecklist {
        let now = Utc::now();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        EmployeeChecklist {
            id: Uuid::new_v4(),
            municipality_id: "2281".to_string(),
            employee: Employee {
                id: "emp-1".to_string(),
                username: "ann01doe".to_string(),
                first_name: "Ann".to_string(),
                last_name: "Doe".to_string(),
                email: None,
                manager_username: None,
            },
            checklist_ids: Vec::new(),
            start_date: date,
            end_date: date,
            expiration_date: date,
            locked: false,
            mentor: None,
            custom_tasks: Vec::new(),
            fulfilments: Vec::new(),
            custom_fulfilments: Vec::new(),
            created: now,
            updated: now,
        }
    }

    fn answer(status: FulfilmentStatus) -> FulfilmentUpdate {
        FulfilmentUpdate::new(status, "ann01doe")
    }

    fn view(
        employee_checklist: &EmployeeChecklist,
        phases: Vec<PhaseView>,
    ) -> EmployeeChecklistView {
        EmployeeChecklistView {
            id: employee_checklist.id,
            employee: employee_checklist.employee.clone(),
            checklist_ids: Vec::new(),
            start_date: employee_checklist.start_date,
            end_date: employee_checklist.end_date,
            expiration_date: employee_checklist.expiration_date,
            locked: false,
            mentor: None,
            completed: false,
            phases,
        }
    }

    /// Two common tasks and one custom task.
    fn scenario(statuses: [FulfilmentStatus; 3]) -> EmployeeChecklistView {
        let (a, b, c) = (task(false), task(false), task(true));
        let mut instance = employee_checklist();
        upsert_fulfilment(&mut instance, a.id, &answer(statuses[0]));
        upsert_fulfilment(&mut instance, b.id, &answer(statuses[1]));
        upsert_custom_fulfilment(&mut instance, c.id, &answer(statuses[2]));
        let view = view(&instance, vec![phase(vec![a, b]), phase(vec![c])]);
        aggregate_fulfilment(view, &instance)
    }

    #[test]
    fn test_true_and_false_both_complete() {
        use FulfilmentStatus::*;
        assert!(scenario([True, False, True]).completed);
    }

    #[test]
    fn test_empty_blocks_completion() {
        use FulfilmentStatus::*;
        assert!(!scenario([True, Empty, True]).completed);
        assert!(!scenario([True, False, Empty]).completed);
    }

    #[test]
    fn test_unrecorded_task_blocks_completion_and_is_kept() {
        let recorded = task(false);
        let unrecorded = task(false);
        let mut instance = employee_checklist();
        upsert_fulfilment(&mut instance, recorded.id, &answer(FulfilmentStatus::True));

        let phases = vec![phase(vec![recorded, unrecorded])];
        let result = aggregate_fulfilment(view(&instance, phases), &instance);

        assert!(!result.completed);
        assert_eq!(result.phases[0].tasks.len(), 2);
        assert_eq!(result.phases[0].tasks[1].fulfilment_status, FulfilmentStatus::Empty);
    }

    #[test]
    fn test_common_record_never_decorates_custom_task() {
        let custom = task(true);
        let mut instance = employee_checklist();
        upsert_fulfilment(&mut instance, custom.id, &answer(FulfilmentStatus::True));

        let result = aggregate_fulfilment(view(&instance, vec![phase(vec![custom])]), &instance);

        assert_eq!(result.phases[0].tasks[0].fulfilment_status, FulfilmentStatus::Empty);
        assert!(!result.completed);
    }

    #[test]
    fn test_upsert_updates_in_place() {
        let task_id = Uuid::new_v4();
        let mut instance = employee_checklist();
        upsert_fulfilment(&mut instance, task_id, &answer(FulfilmentStatus::False));
        let updated = upsert_fulfilment(
            &mut instance,
            task_id,
            &FulfilmentUpdate::new(FulfilmentStatus::True, "bob01boss").with_response_text("done"),
        );

        assert_eq!(instance.fulfilments.len(), 1);
        assert_eq!(updated.status, FulfilmentStatus::True);
        assert_eq!(instance.fulfilments[0].last_saved_by, "bob01boss");
        assert_eq!(instance.fulfilments[0].response_text.as_deref(), Some("done"));
    }

    #[test]
    fn test_fulfil_phase_rejects_locked_instance() {
        let mut instance = employee_checklist();
        instance.locked = true;
        let phase = phase(vec![task(false)]);

        let err = fulfil_phase(&mut instance, &phase, &answer(FulfilmentStatus::True)).unwrap_err();

        assert!(matches!(err, OnboardingError::Locked(_)));
        assert!(instance.fulfilments.is_empty());
    }

    #[test]
    fn test_single_task_upsert_ignores_lock() {
        let mut instance = employee_checklist();
        instance.locked = true;
        upsert_fulfilment(&mut instance, Uuid::new_v4(), &answer(FulfilmentStatus::True));
        assert_eq!(instance.fulfilments.len(), 1);
    }

    #[test]
    fn test_fulfil_phase_routes_by_task_kind() {
        let mut instance = employee_checklist();
        let phase = phase(vec![task(false), task(true), task(false)]);

        let updated =
            fulfil_phase(&mut instance, &phase, &answer(FulfilmentStatus::False)).unwrap();

        assert_eq!(updated, 3);
        assert_eq!(instance.fulfilments.len(), 2);
        assert_eq!(instance.custom_fulfilments.len(), 1);
    }
}
