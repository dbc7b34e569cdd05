//! Checklist life cycle rules.
//!
//! `Created` is the draft state, `Active` the version in use and
//! `Deprecated` a superseded version. At most one version per name and
//! municipality is active.

use tracing::info;

use crate::error::{OnboardingError, Result};
use crate::storage::types::{Checklist, LifeCycle};

fn describe(checklist: &Checklist) -> String {
    match checklist.id {
        Some(id) => format!(
            "Checklist '{}' version {} ({})",
            checklist.name, checklist.version, id
        ),
        None => format!("Checklist '{}' version {}", checklist.name, checklist.version),
    }
}

/// Only drafts may be edited or deleted.
pub fn ensure_draft(checklist: &Checklist) -> Result<()> {
    if checklist.life_cycle != LifeCycle::Created {
        return Err(OnboardingError::Conflict(format!(
            "{} is {} and can no longer be changed",
            describe(checklist),
            checklist.life_cycle
        )));
    }
    Ok(())
}

/// Next version number among all versions of one checklist name.
pub fn next_version(versions: &[Checklist]) -> i32 {
    versions
        .iter()
        .map(|checklist| checklist.version)
        .max()
        .unwrap_or(0)
        + 1
}

/// A name may have at most one draft at a time.
pub fn ensure_no_draft(versions: &[Checklist]) -> Result<()> {
    match versions
        .iter()
        .find(|checklist| checklist.life_cycle == LifeCycle::Created)
    {
        Some(draft) => Err(OnboardingError::Conflict(format!(
            "{} is already being drafted",
            describe(draft)
        ))),
        None => Ok(()),
    }
}

/// Activate `draft`, deprecating the currently active version if any.
///
/// # Errors
///
/// Returns `OnboardingError::Conflict` if `draft` is not in `Created`, or if
/// `current` is not the active version of the same checklist.
pub fn activate(draft: &mut Checklist, current: Option<&mut Checklist>) -> Result<()> {
    ensure_draft(draft)?;

    if let Some(current) = current {
        if current.life_cycle != LifeCycle::Active
            || current.name != draft.name
            || current.municipality_id != draft.municipality_id
        {
            return Err(OnboardingError::Conflict(format!(
                "{} is not the active version of '{}'",
                describe(current),
                draft.name
            )));
        }
        current.life_cycle = LifeCycle::Deprecated;
        info!(
            checklist = %current.name,
            version = current.version,
            "deprecated checklist version"
        );
    }

    draft.life_cycle = LifeCycle::Active;
    info!(
        checklist = %draft.name,
        version = draft.version,
        "activated checklist version"
    );
    Ok(())
}
