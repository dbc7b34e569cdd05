//! Sort-order overlay.
//!
//! Organizations can re-order phases and tasks without touching the
//! checklist itself. Overrides replace the `sort_order` of matching view
//! components; everything is then sorted by (sort order, name) for phases and
//! (sort order, heading) for tasks, which gives a total order even when
//! structural sort orders collide.

use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use crate::storage::types::{ComponentType, SortOrder};
use crate::view::{ChecklistView, EmployeeChecklistView, PhaseView, TaskView};

fn compare_phases(left: &PhaseView, right: &PhaseView) -> Ordering {
    left.sort_order
        .cmp(&right.sort_order)
        .then_with(|| left.name.cmp(&right.name))
}

fn compare_tasks(left: &TaskView, right: &TaskView) -> Ordering {
    left.sort_order
        .cmp(&right.sort_order)
        .then_with(|| left.heading.cmp(&right.heading))
}

/// Sort phases, and the tasks of each phase, by the default comparators.
pub fn sort_phases(phases: &mut [PhaseView]) {
    for phase in phases.iter_mut() {
        phase.tasks.sort_by(compare_tasks);
    }
    phases.sort_by(compare_phases);
}

/// Overlay positions onto phases and tasks, then sort.
///
/// Components without an override keep their structural sort order. An
/// override only applies to a component of its own type.
pub fn overlay_sort_order(phases: &mut [PhaseView], overrides: &[SortOrder]) {
    let positions: HashMap<(ComponentType, Uuid), i32> = overrides
        .iter()
        .map(|o| ((o.component_type, o.component_id), o.position))
        .collect();

    for phase in phases.iter_mut() {
        if let Some(position) = positions.get(&(ComponentType::Phase, phase.id)) {
            phase.sort_order = *position;
        }
        for task in phase.tasks.iter_mut() {
            if let Some(position) = positions.get(&(ComponentType::Task, task.id)) {
                task.sort_order = *position;
            }
        }
    }

    sort_phases(phases);
}

/// Views whose phases can be re-ordered.
pub trait Sortable {
    fn phases_mut(&mut self) -> &mut [PhaseView];
}

impl Sortable for ChecklistView {
    fn phases_mut(&mut self) -> &mut [PhaseView] {
        &mut self.phases
    }
}

impl Sortable for EmployeeChecklistView {
    fn phases_mut(&mut self) -> &mut [PhaseView] {
        &mut self.phases
    }
}

/// Apply an organization's overrides to a view and return it.
pub fn apply_sort_order<V: Sortable>(mut view: V, overrides: &[SortOrder]) -> V {
    overlay_sort_order(view.phases_mut(), overrides);
    view
}
