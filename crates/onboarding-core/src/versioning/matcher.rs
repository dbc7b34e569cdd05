//! Task identity matching between checklist versions.
//!
//! Cloning gives every task a new id. Matching pairs the tasks of two
//! versions by structure so fulfilment records can follow a task into the
//! next version.
//!
//! Pairing is first-match-wins in origin order. Two structurally identical
//! tasks in the origin are indistinguishable: both clone counterparts map to
//! the first one.

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::storage::types::{Fulfilment, Task};

/// Structural equality: everything but identity and audit data.
pub fn is_structurally_equal(left: &Task, right: &Task) -> bool {
    left.sort_order == right.sort_order
        && left.role_type == right.role_type
        && left.question_type == right.question_type
        && left.heading == right.heading
        && left.text == right.text
        && left.phase_id == right.phase_id
}

/// Map each clone task id to the id of its first structural match in `origin`.
///
/// Tasks without an id on either side, and clone tasks without a match, are
/// left out. `None` on either side yields an empty map.
pub fn match_task_ids(clone: Option<&[Task]>, origin: Option<&[Task]>) -> HashMap<Uuid, Uuid> {
    let (Some(clone), Some(origin)) = (clone, origin) else {
        return HashMap::new();
    };

    let mut mapping = HashMap::new();
    for task in clone {
        let Some(clone_id) = task.id else {
            continue;
        };
        let matched = origin
            .iter()
            .filter(|candidate| is_structurally_equal(task, candidate))
            .find_map(|candidate| candidate.id);
        if let Some(origin_id) = matched {
            mapping.insert(clone_id, origin_id);
        }
    }

    debug!(
        clone_tasks = clone.len(),
        origin_tasks = origin.len(),
        matched = mapping.len(),
        "matched tasks between checklist versions"
    );
    mapping
}

/// Re-point fulfilment records from origin task ids to clone task ids.
///
/// `mapping` is clone id -> origin id as produced by [`match_task_ids`].
/// Records whose task has no counterpart are left untouched. When several
/// clone tasks share one origin task, every one of them receives a copy of
/// the record. Returns the number of records re-pointed.
pub fn repoint_fulfilments(
    fulfilments: &mut Vec<Fulfilment>,
    mapping: &HashMap<Uuid, Uuid>,
) -> usize {
    let mut by_origin: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (clone_id, origin_id) in mapping {
        by_origin.entry(*origin_id).or_default().push(*clone_id);
    }
    for clone_ids in by_origin.values_mut() {
        clone_ids.sort();
    }

    let mut repointed = 0;
    let mut result = Vec::with_capacity(fulfilments.len());
    for fulfilment in fulfilments.drain(..) {
        match by_origin.get(&fulfilment.task_id) {
            Some(clone_ids) => {
                repointed += 1;
                for clone_id in clone_ids {
                    result.push(Fulfilment {
                        task_id: *clone_id,
                        ..fulfilment.clone()
                    });
                }
            }
            None => result.push(fulfilment),
        }
    }
    *fulfilments = result;
    repointed
}
