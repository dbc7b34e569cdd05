//! Checklist resolution along an employee's organizational hierarchy.
//!
//! The hierarchy comes from the HR directory as an ordered list of
//! organization numbers, most specific unit first. Nothing here stores or
//! derives parent/child relations.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{OnboardingError, Result};
use crate::storage::traits::StorageEngine;
use crate::storage::types::{Checklist, LifeCycle};

/// Organization numbers from the employee's department (first) up to the
/// top-level company (last).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrganizationPath {
    units: Vec<i32>,
}

impl OrganizationPath {
    pub fn new(leaf_to_root: impl IntoIterator<Item = i32>) -> Self {
        Self {
            units: leaf_to_root.into_iter().collect(),
        }
    }

    pub fn units(&self) -> &[i32] {
        &self.units
    }
}

/// Collect every active checklist attached to a unit on `path`.
///
/// Units are visited from the most specific outward and every match is kept,
/// so a department checklist comes before a company-wide one. Units unknown
/// to the municipality are skipped. A checklist reached twice (a unit listed
/// more than once) is kept only at its first position.
///
/// # Errors
///
/// Returns `OnboardingError::NoMatchingChecklist` naming the employee and the
/// searched organization numbers when nothing on the path has an active
/// checklist.
pub fn resolve_checklists<S>(
    storage: &S,
    municipality_id: &str,
    employee: &str,
    path: &OrganizationPath,
) -> Result<Vec<Checklist>>
where
    S: StorageEngine + ?Sized,
{
    let mut matched = Vec::new();
    let mut seen = HashSet::new();

    for &organization_number in path.units() {
        let Some(organization) = storage.get_organization(municipality_id, organization_number)?
        else {
            debug!(organization_number, "organization not registered, skipping");
            continue;
        };

        let active: Vec<Checklist> = storage
            .list_checklists_for_organization(&organization.id)?
            .into_iter()
            .filter(|checklist| checklist.life_cycle == LifeCycle::Active)
            .collect();

        debug!(
            organization_number,
            active = active.len(),
            "checked organization for active checklists"
        );
        matched.extend(active.into_iter().filter(|checklist| seen.insert(checklist.id)));
    }

    if matched.is_empty() {
        return Err(OnboardingError::NoMatchingChecklist {
            employee: employee.to_string(),
            searched: path.units().to_vec(),
        });
    }

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::SqliteStorage;
    use crate::storage::types::NewOrganization;
    use uuid::Uuid;

    const MUNICIPALITY: &str = "2281";

    fn attach(
        storage: &mut SqliteStorage,
        organization_id: Uuid,
        name: &str,
        life_cycle: LifeCycle,
    ) {
        let checklist = Checklist {
            id: None,
            name: name.to_string(),
            display_name: name.to_string(),
            version: 1,
            life_cycle,
            municipality_id: MUNICIPALITY.to_string(),
            organization_id: Some(organization_id),
            tasks: Vec::new(),
            created: None,
            updated: None,
            last_saved_by: None,
        };
        storage.save_checklist(&checklist).unwrap();
    }

    fn hierarchy() -> (SqliteStorage, Uuid, Uuid) {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage
            .create_organization(&NewOrganization::new(MUNICIPALITY, 7, "Department"))
            .unwrap();
        let mid = storage
            .create_organization(&NewOrganization::new(MUNICIPALITY, 15, "Division"))
            .unwrap();
        let root = storage
            .create_organization(&NewOrganization::new(MUNICIPALITY, 42, "Company"))
            .unwrap();
        (storage, mid, root)
    }

    fn names(checklists: &[Checklist]) -> Vec<&str> {
        checklists.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_only_root_has_active_checklist() {
        let (mut storage, _mid, root) = hierarchy();
        attach(&mut storage, root, "company", LifeCycle::Active);

        let path = OrganizationPath::new([7, 15, 42]);
        let resolved = resolve_checklists(&storage, MUNICIPALITY, "ann01doe", &path).unwrap();

        assert_eq!(names(&resolved), vec!["company"]);
    }

    #[test]
    fn test_collects_every_level_most_specific_first() {
        let (mut storage, mid, root) = hierarchy();
        attach(&mut storage, root, "company", LifeCycle::Active);
        attach(&mut storage, mid, "division", LifeCycle::Active);

        let path = OrganizationPath::new([7, 15, 42]);
        let resolved = resolve_checklists(&storage, MUNICIPALITY, "ann01doe", &path).unwrap();

        assert_eq!(names(&resolved), vec!["division", "company"]);
    }

    #[test]
    fn test_non_active_checklists_are_ignored() {
        let (mut storage, mid, root) = hierarchy();
        attach(&mut storage, mid, "draft", LifeCycle::Created);
        attach(&mut storage, root, "old", LifeCycle::Deprecated);

        let path = OrganizationPath::new([7, 15, 42]);
        let err = resolve_checklists(&storage, MUNICIPALITY, "ann01doe", &path).unwrap_err();

        match err {
            OnboardingError::NoMatchingChecklist { employee, searched } => {
                assert_eq!(employee, "ann01doe");
                assert_eq!(searched, vec![7, 15, 42]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_units_and_other_municipalities_are_skipped() {
        let (mut storage, _mid, root) = hierarchy();
        attach(&mut storage, root, "company", LifeCycle::Active);

        let path = OrganizationPath::new([99, 42]);
        assert_eq!(
            names(&resolve_checklists(&storage, MUNICIPALITY, "ann01doe", &path).unwrap()),
            vec!["company"]
        );
        assert!(resolve_checklists(&storage, "2262", "ann01doe", &path).is_err());
    }

    #[test]
    fn test_repeated_units_resolve_each_checklist_once() {
        let (mut storage, mid, root) = hierarchy();
        attach(&mut storage, root, "company", LifeCycle::Active);
        attach(&mut storage, mid, "division", LifeCycle::Active);

        let path = OrganizationPath::new([15, 42, 15, 42]);
        let resolved = resolve_checklists(&storage, MUNICIPALITY, "ann01doe", &path).unwrap();

        assert_eq!(names(&resolved), vec!["division", "company"]);
    }
}
