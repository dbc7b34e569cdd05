use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use onboarding_core::storage::{
    ComponentType, Employee, FulfilmentStatus, LifeCycle, NewChecklist, NewCustomTask,
    NewOrganization, NewPhase, NewTask, QuestionType, RoleType, SortOrder, SqliteStorage,
    StorageEngine,
};
use onboarding_core::{
    match_task_ids, FulfilmentUpdate, Initiation, Onboarding, OnboardingError, OrganizationPath,
};

const MUNICIPALITY: &str = "2281";

struct Fixture {
    onboarding: Onboarding<SqliteStorage>,
    first_day: Uuid,
    first_month: Uuid,
}

fn fixture() -> Fixture {
    let mut storage = SqliteStorage::open_in_memory().expect("in-memory storage");
    for (number, name) in [(7, "IT department"), (15, "Operations"), (42, "Company")] {
        storage
            .create_organization(&NewOrganization::new(MUNICIPALITY, number, name))
            .expect("create organization");
    }
    let first_day = storage
        .create_phase(&NewPhase::new(MUNICIPALITY, "First day", 1).with_time_to_complete("P1D"))
        .expect("create phase");
    let first_month = storage
        .create_phase(&NewPhase::new(MUNICIPALITY, "First month", 2).with_time_to_complete("P1M"))
        .expect("create phase");

    Fixture {
        onboarding: Onboarding::new(storage),
        first_day,
        first_month,
    }
}

fn definition(first_day: Uuid, first_month: Uuid) -> NewChecklist {
    NewChecklist::new(MUNICIPALITY, 42, "onboarding", "Onboarding v1")
        .with_task(NewTask::new(first_day, "Collect badge", 1))
        .with_task(
            NewTask::new(first_day, "Set up laptop", 2)
                .with_question_type(QuestionType::YesOrNoWithText),
        )
        .with_task(
            NewTask::new(first_month, "Introduction meeting", 1)
                .with_role_type(RoleType::ManagerForNewEmployee)
                .with_text("Book a meeting with the team"),
        )
        .with_last_saved_by("admin01")
}

fn initiation(employee_id: &str, path: &[i32]) -> Initiation {
    Initiation {
        municipality_id: MUNICIPALITY.to_string(),
        employee: Employee {
            id: employee_id.to_string(),
            username: format!("{}user", employee_id),
            first_name: "Ann".to_string(),
            last_name: "Doe".to_string(),
            email: Some("ann.doe@example.com".to_string()),
            manager_username: Some("bob01boss".to_string()),
        },
        path: OrganizationPath::new(path.iter().copied()),
        start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        end_date: None,
        mentor: None,
    }
}

#[test]
fn test_version_upgrade_keeps_fulfilment() {
    let mut fixture = fixture();
    let v1 = fixture
        .onboarding
        .import_checklist(&definition(fixture.first_day, fixture.first_month))
        .expect("import");
    let v1_id = v1.id.expect("saved");
    fixture.onboarding.activate_checklist(&v1_id).expect("activate v1");

    // Resolution: only the company (42) has a checklist.
    let employee_checklist = fixture
        .onboarding
        .initiate_employee_checklist(&initiation("emp-1", &[7, 15, 42]))
        .expect("initiate");
    assert_eq!(employee_checklist.checklist_ids, vec![v1_id]);
    let resolved = fixture
        .onboarding
        .require_checklist(&employee_checklist.checklist_ids[0])
        .unwrap();
    assert_eq!(resolved.display_name, "Onboarding v1");

    // Two answers on v1 tasks.
    let badge = v1.tasks[0].id.unwrap();
    let laptop = v1.tasks[1].id.unwrap();
    fixture
        .onboarding
        .update_task_fulfilment(
            &employee_checklist.id,
            &badge,
            &FulfilmentUpdate::new(FulfilmentStatus::True, "emp-1user"),
        )
        .unwrap();
    fixture
        .onboarding
        .update_task_fulfilment(
            &employee_checklist.id,
            &laptop,
            &FulfilmentUpdate::new(FulfilmentStatus::False, "emp-1user")
                .with_response_text("Waiting for IT"),
        )
        .unwrap();

    // New version by cloning.
    let v2 = fixture
        .onboarding
        .create_new_version(&v1_id, "admin01")
        .expect("new version");
    assert_eq!(v2.version, 2);
    assert_eq!(v2.life_cycle, LifeCycle::Created);
    let v1_ids: HashSet<_> = v1.task_ids().into_iter().collect();
    assert!(v2.task_ids().iter().all(|id| !v1_ids.contains(id)));

    let mapping = match_task_ids(Some(v2.tasks.as_slice()), Some(v1.tasks.as_slice()));
    assert_eq!(mapping.len(), v2.tasks.len());
    for task in &v2.tasks {
        let origin = v1.find_task(&mapping[&task.id.unwrap()]).unwrap();
        assert_eq!(origin.heading, task.heading);
    }

    // Activation moves the in-flight employee checklist onto v2.
    let activation = fixture
        .onboarding
        .activate_checklist(&v2.id.unwrap())
        .expect("activate v2");
    assert_eq!(activation.migrated_employee_checklists, 1);
    assert_eq!(activation.repointed_fulfilments, 2);
    assert_eq!(
        fixture.onboarding.require_checklist(&v1_id).unwrap().life_cycle,
        LifeCycle::Deprecated
    );

    let migrated = fixture
        .onboarding
        .require_employee_checklist(&employee_checklist.id)
        .unwrap();
    assert_eq!(migrated.checklist_ids, vec![v2.id.unwrap()]);
    assert_eq!(migrated.fulfilments.len(), 2);

    let view = fixture
        .onboarding
        .employee_checklist_view(&employee_checklist.id, None)
        .unwrap();
    let statuses: Vec<_> = view
        .phases
        .iter()
        .flat_map(|phase| phase.tasks.iter())
        .map(|task| (task.heading.as_str(), task.fulfilment_status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("Collect badge", FulfilmentStatus::True),
            ("Set up laptop", FulfilmentStatus::False),
            ("Introduction meeting", FulfilmentStatus::Empty),
        ]
    );
    assert!(!view.completed);
}

#[test]
fn test_completion_and_custom_tasks() {
    let mut fixture = fixture();
    let v1 = fixture
        .onboarding
        .import_checklist(&definition(fixture.first_day, fixture.first_month))
        .unwrap();
    fixture.onboarding.activate_checklist(&v1.id.unwrap()).unwrap();
    let employee_checklist = fixture
        .onboarding
        .initiate_employee_checklist(&initiation("emp-2", &[7, 42]))
        .unwrap();

    let custom = fixture
        .onboarding
        .add_custom_task(
            &employee_checklist.id,
            &NewCustomTask::new(fixture.first_day, "Meet your mentor", 3),
            "bob01boss",
        )
        .unwrap();

    let answer = FulfilmentUpdate::new(FulfilmentStatus::True, "emp-2user");
    let updated = fixture
        .onboarding
        .update_phase_fulfilment(&employee_checklist.id, &fixture.first_day, &answer)
        .unwrap();
    assert_eq!(updated, 3);

    let view = fixture
        .onboarding
        .employee_checklist_view(&employee_checklist.id, None)
        .unwrap();
    assert!(!view.completed);
    let custom_view = view.phases[0]
        .tasks
        .iter()
        .find(|task| task.id == custom.id)
        .unwrap();
    assert!(custom_view.custom);
    assert_eq!(custom_view.fulfilment_status, FulfilmentStatus::True);

    let meeting = v1.tasks[2].id.unwrap();
    fixture
        .onboarding
        .update_task_fulfilment(
            &employee_checklist.id,
            &meeting,
            &FulfilmentUpdate::new(FulfilmentStatus::False, "bob01boss"),
        )
        .unwrap();
    let view = fixture
        .onboarding
        .employee_checklist_view(&employee_checklist.id, None)
        .unwrap();
    assert!(view.completed);

    fixture
        .onboarding
        .delete_custom_task(&employee_checklist.id, &custom.id)
        .unwrap();
    let reloaded = fixture
        .onboarding
        .require_employee_checklist(&employee_checklist.id)
        .unwrap();
    assert!(reloaded.custom_tasks.is_empty());
    assert!(reloaded.custom_fulfilments.is_empty());
}

#[test]
fn test_locked_employee_checklist() {
    let mut fixture = fixture();
    let v1 = fixture
        .onboarding
        .import_checklist(&definition(fixture.first_day, fixture.first_month))
        .unwrap();
    fixture.onboarding.activate_checklist(&v1.id.unwrap()).unwrap();
    let employee_checklist = fixture
        .onboarding
        .initiate_employee_checklist(&initiation("emp-3", &[42]))
        .unwrap();

    let far_future = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    assert_eq!(fixture.onboarding.lock_expired(MUNICIPALITY, far_future).unwrap(), 1);
    assert_eq!(fixture.onboarding.lock_expired(MUNICIPALITY, far_future).unwrap(), 0);

    let answer = FulfilmentUpdate::new(FulfilmentStatus::True, "emp-3user");
    let err = fixture
        .onboarding
        .update_phase_fulfilment(&employee_checklist.id, &fixture.first_day, &answer)
        .unwrap_err();
    assert!(matches!(err, OnboardingError::Locked(_)));

    // The single-task path does not check the lock.
    fixture
        .onboarding
        .update_task_fulfilment(&employee_checklist.id, &v1.tasks[0].id.unwrap(), &answer)
        .unwrap();

    let err = fixture
        .onboarding
        .add_custom_task(
            &employee_checklist.id,
            &NewCustomTask::new(fixture.first_day, "Too late", 1),
            "bob01boss",
        )
        .unwrap_err();
    assert!(matches!(err, OnboardingError::Locked(_)));
}

#[test]
fn test_initiation_failures() {
    let mut fixture = fixture();
    let err = fixture
        .onboarding
        .initiate_employee_checklist(&initiation("emp-4", &[7, 15, 42]))
        .unwrap_err();
    assert!(matches!(err, OnboardingError::NoMatchingChecklist { .. }));
    assert!(err.to_string().contains("7, 15, 42"));

    let v1 = fixture
        .onboarding
        .import_checklist(&definition(fixture.first_day, fixture.first_month))
        .unwrap();
    fixture.onboarding.activate_checklist(&v1.id.unwrap()).unwrap();
    fixture
        .onboarding
        .initiate_employee_checklist(&initiation("emp-4", &[42]))
        .unwrap();
    let err = fixture
        .onboarding
        .initiate_employee_checklist(&initiation("emp-4", &[42]))
        .unwrap_err();
    assert!(matches!(err, OnboardingError::Conflict(_)));
}

#[test]
fn test_draft_rules() {
    let mut fixture = fixture();
    let v1 = fixture
        .onboarding
        .import_checklist(&definition(fixture.first_day, fixture.first_month))
        .unwrap();
    let v1_id = v1.id.unwrap();

    // A second draft of the same name is refused.
    assert!(matches!(
        fixture.onboarding.create_new_version(&v1_id, "admin01"),
        Err(OnboardingError::Conflict(_))
    ));

    fixture.onboarding.activate_checklist(&v1_id).unwrap();
    assert!(matches!(
        fixture.onboarding.delete_checklist(&v1_id),
        Err(OnboardingError::Conflict(_))
    ));

    let v2 = fixture.onboarding.create_new_version(&v1_id, "admin01").unwrap();
    fixture.onboarding.delete_checklist(&v2.id.unwrap()).unwrap();
    assert!(fixture
        .onboarding
        .storage()
        .get_checklist(&v2.id.unwrap())
        .unwrap()
        .is_none());
}

#[test]
fn test_sort_order_overrides_in_views() {
    let mut fixture = fixture();
    let v1 = fixture
        .onboarding
        .import_checklist(&definition(fixture.first_day, fixture.first_month))
        .unwrap();
    let v1_id = v1.id.unwrap();

    fixture
        .onboarding
        .set_sort_order(&SortOrder {
            municipality_id: MUNICIPALITY.to_string(),
            organization_number: 42,
            component_id: fixture.first_month,
            component_type: ComponentType::Phase,
            position: 0,
        })
        .unwrap();

    let view = fixture.onboarding.checklist_view(&v1_id, None).unwrap();
    let names: Vec<_> = view.phases.iter().map(|phase| phase.name.as_str()).collect();
    assert_eq!(names, vec!["First month", "First day"]);

    // Another organization sees the structural order.
    let view = fixture.onboarding.checklist_view(&v1_id, Some(7)).unwrap();
    let names: Vec<_> = view.phases.iter().map(|phase| phase.name.as_str()).collect();
    assert_eq!(names, vec!["First day", "First month"]);

    // Structural order in storage is unchanged.
    let phase = fixture
        .onboarding
        .storage()
        .get_phase(&fixture.first_month)
        .unwrap()
        .unwrap();
    assert_eq!(phase.sort_order, 2);
}

fn task_override(component_id: Uuid, organization_number: i32, position: i32) -> SortOrder {
    SortOrder {
        municipality_id: MUNICIPALITY.to_string(),
        organization_number,
        component_id,
        component_type: ComponentType::Task,
        position,
    }
}

fn first_day_headings(onboarding: &Onboarding<SqliteStorage>, checklist_id: &Uuid) -> Vec<String> {
    let view = onboarding.checklist_view(checklist_id, None).unwrap();
    view.phases[0]
        .tasks
        .iter()
        .map(|task| task.heading.clone())
        .collect()
}

#[test]
fn test_task_sort_order_follows_new_version() {
    let mut fixture = fixture();
    let v1 = fixture
        .onboarding
        .import_checklist(&definition(fixture.first_day, fixture.first_month))
        .unwrap();
    let v1_id = v1.id.unwrap();
    fixture.onboarding.activate_checklist(&v1_id).unwrap();

    let laptop = v1.tasks[1].id.unwrap();
    fixture
        .onboarding
        .set_sort_order(&task_override(laptop, 42, 0))
        .unwrap();
    assert_eq!(
        first_day_headings(&fixture.onboarding, &v1_id),
        vec!["Set up laptop", "Collect badge"]
    );

    let v2 = fixture.onboarding.create_new_version(&v1_id, "admin01").unwrap();
    let v2_id = v2.id.unwrap();
    assert_eq!(
        first_day_headings(&fixture.onboarding, &v2_id),
        vec!["Set up laptop", "Collect badge"]
    );

    // The copy lands on the new task id and v1 keeps its own row.
    let overrides = fixture
        .onboarding
        .storage()
        .list_sort_orders(MUNICIPALITY, 42)
        .unwrap();
    let v2_laptop = v2.tasks[1].id.unwrap();
    assert_eq!(overrides.len(), 2);
    assert!(overrides.iter().any(|o| o.component_id == laptop));
    assert!(overrides.iter().any(|o| o.component_id == v2_laptop && o.position == 0));

    // Still in place once v2 replaces v1.
    fixture.onboarding.activate_checklist(&v2_id).unwrap();
    assert_eq!(
        first_day_headings(&fixture.onboarding, &v2_id),
        vec!["Set up laptop", "Collect badge"]
    );
}

#[test]
fn test_sort_order_requires_known_organization_and_task() {
    let mut fixture = fixture();
    let v1 = fixture
        .onboarding
        .import_checklist(&definition(fixture.first_day, fixture.first_month))
        .unwrap();
    let badge = v1.tasks[0].id.unwrap();

    let err = fixture
        .onboarding
        .set_sort_order(&task_override(badge, 99, 0))
        .unwrap_err();
    assert!(matches!(err, OnboardingError::NotFound(_)));

    let err = fixture
        .onboarding
        .set_sort_order(&task_override(Uuid::new_v4(), 42, 0))
        .unwrap_err();
    assert!(matches!(err, OnboardingError::NotFound(_)));

    // A phase id is not a task.
    let err = fixture
        .onboarding
        .set_sort_order(&task_override(fixture.first_day, 42, 0))
        .unwrap_err();
    assert!(matches!(err, OnboardingError::NotFound(_)));

    fixture
        .onboarding
        .set_sort_order(&task_override(badge, 7, 5))
        .unwrap();
    let overrides = fixture
        .onboarding
        .storage()
        .list_sort_orders(MUNICIPALITY, 7)
        .unwrap();
    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides[0].position, 5);
}

#[test]
fn test_update_draft() {
    let mut fixture = fixture();
    let v1 = fixture
        .onboarding
        .import_checklist(&definition(fixture.first_day, fixture.first_month))
        .unwrap();
    let v1_id = v1.id.unwrap();

    let mut edited = v1.clone();
    edited.display_name = "Onboarding for new staff".to_string();
    edited.tasks.remove(1);
    let saved = fixture.onboarding.update_draft(&edited).unwrap();
    assert_eq!(saved.life_cycle, LifeCycle::Created);

    let stored = fixture.onboarding.require_checklist(&v1_id).unwrap();
    assert_eq!(stored.display_name, "Onboarding for new staff");
    let headings: Vec<_> = stored.tasks.iter().map(|task| task.heading.as_str()).collect();
    assert_eq!(headings, vec!["Collect badge", "Introduction meeting"]);

    // Name and version are fixed.
    let mut renamed = stored.clone();
    renamed.name = "welcome".to_string();
    assert!(matches!(
        fixture.onboarding.update_draft(&renamed),
        Err(OnboardingError::InvalidInput(_))
    ));
    let mut bumped = stored.clone();
    bumped.version = 5;
    assert!(matches!(
        fixture.onboarding.update_draft(&bumped),
        Err(OnboardingError::InvalidInput(_))
    ));

    // Only drafts can be edited.
    fixture.onboarding.activate_checklist(&v1_id).unwrap();
    let mut active = fixture.onboarding.require_checklist(&v1_id).unwrap();
    active.display_name = "Too late".to_string();
    assert!(matches!(
        fixture.onboarding.update_draft(&active),
        Err(OnboardingError::Conflict(_))
    ));
    assert_eq!(
        fixture.onboarding.require_checklist(&v1_id).unwrap().display_name,
        "Onboarding for new staff"
    );
}
