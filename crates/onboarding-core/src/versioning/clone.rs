//! Version cloning.
//!
//! A clone is an unpersisted, editable copy of a checklist that becomes a
//! new version once saved. The reset list is spelled out field by field in
//! `clone_checklist` and `clone_task`.

use crate::error::{OnboardingError, Result};
use crate::storage::types::{Checklist, LifeCycle, Task};

/// Copy a checklist into a new draft version.
///
/// The copy has no id, no audit timestamps, life cycle `Created` and the
/// given `version`. Every task loses its id and timestamps but keeps its
/// phase reference, since phases are shared between versions.
///
/// # Errors
///
/// Returns `OnboardingError::InvalidInput` if `version` is not positive.
pub fn clone_checklist(checklist: &Checklist, version: i32) -> Result<Checklist> {
    if version < 1 {
        return Err(OnboardingError::InvalidInput(format!(
            "Checklist version must be positive, got {}",
            version
        )));
    }

    Ok(Checklist {
        id: None,
        name: checklist.name.clone(),
        display_name: checklist.display_name.clone(),
        version,
        life_cycle: LifeCycle::Created,
        municipality_id: checklist.municipality_id.clone(),
        organization_id: checklist.organization_id,
        tasks: checklist.tasks.iter().map(clone_task).collect(),
        created: None,
        updated: None,
        last_saved_by: checklist.last_saved_by.clone(),
    })
}

fn clone_task(task: &Task) -> Task {
    Task {
        id: None,
        phase_id: task.phase_id,
        heading: task.heading.clone(),
        heading_reference: task.heading_reference.clone(),
        text: task.text.clone(),
        sort_order: task.sort_order,
        role_type: task.role_type,
        question_type: task.question_type,
        permission: task.permission,
        created: None,
        updated: None,
        last_saved_by: task.last_saved_by.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::{Permission, QuestionType, RoleType};
    use chrono::Utc;
    use uuid::Uuid;

    fn active_checklist() -> Checklist {
        let now = Utc::now();
        let phase_id = Uuid::new_v4();
        let task = |heading: &str, sort_order| Task {
            id: Some(Uuid::new_v4()),
            phase_id: Some(phase_id),
            heading: heading.to_string(),
            heading_reference: None,
            text: Some(format!("{} text", heading)),
            sort_order,
            role_type: RoleType::NewEmployee,
            question_type: QuestionType::YesOrNo,
            permission: Permission::Admin,
            created: Some(now),
            updated: Some(now),
            last_saved_by: Some("admin".to_string()),
        };
        Checklist {
            id: Some(Uuid::new_v4()),
            name: "onboarding".to_string(),
            display_name: "Onboarding v1".to_string(),
            version: 1,
            life_cycle: LifeCycle::Active,
            municipality_id: "2281".to_string(),
            organization_id: Some(Uuid::new_v4()),
            tasks: vec![task("Badge", 1), task("Laptop", 2)],
            created: Some(now),
            updated: Some(now),
            last_saved_by: Some("admin".to_string()),
        }
    }

    #[test]
    fn test_clone_resets_identity() {
        let original = active_checklist();
        let clone = clone_checklist(&original, 2).unwrap();

        assert_ne!(clone.id, original.id);
        assert!(clone.id.is_none());
        assert_eq!(clone.version, 2);
        assert_eq!(clone.life_cycle, LifeCycle::Created);
        assert!(clone.created.is_none());
        assert!(clone.updated.is_none());
        for task in &clone.tasks {
            assert!(task.id.is_none());
            assert!(task.created.is_none());
            assert!(task.updated.is_none());
        }
    }

    #[test]
    fn test_clone_keeps_structure_and_phase_references() {
        let original = active_checklist();
        let clone = clone_checklist(&original, 2).unwrap();

        assert_eq!(clone.name, original.name);
        assert_eq!(clone.organization_id, original.organization_id);
        assert_eq!(clone.tasks.len(), original.tasks.len());
        for (copy, source) in clone.tasks.iter().zip(&original.tasks) {
            assert_eq!(copy.phase_id, source.phase_id);
            assert_eq!(copy.heading, source.heading);
            assert_eq!(copy.text, source.text);
            assert_eq!(copy.sort_order, source.sort_order);
        }
    }

    #[test]
    fn test_clone_is_isolated_from_original() {
        let original = active_checklist();
        let snapshot = original.clone();
        let mut clone = clone_checklist(&original, 2).unwrap();

        clone.display_name = "Changed".to_string();
        clone.tasks[0].heading = "Changed".to_string();
        clone.tasks.pop();

        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_clone_rejects_non_positive_version() {
        let err = clone_checklist(&active_checklist(), 0).unwrap_err();
        assert!(matches!(err, OnboardingError::InvalidInput(_)));
    }
}
