//! Framework precedence
//!
//! Orders the candidates a project can consume, nearest first, by asking the
//! bound release for the nearest remaining candidate until none is left.

use tracing::debug;

use crate::error::SandboxError;
use crate::facade::{Framework, FrameworkLogic};

/// Candidates compatible with `project`, in input order
pub fn compatible(
    logic: &dyn FrameworkLogic,
    project: &Framework,
    candidates: &[Framework],
) -> Result<Vec<Framework>, SandboxError> {
    let mut compatible = Vec::new();
    for candidate in candidates {
        if logic.is_compatible(project, candidate)? {
            compatible.push(candidate.clone());
        }
    }
    Ok(compatible)
}

/// Compatible candidates, nearest first. Candidates with the same canonical
/// name count once.
pub fn precedence(
    logic: &dyn FrameworkLogic,
    project: &Framework,
    candidates: &[Framework],
) -> Result<Vec<Framework>, SandboxError> {
    let mut remaining = compatible(logic, project, candidates)?;
    let mut ordered = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let Some(nearest) = logic.get_nearest(project, &remaining)? else {
            debug!(
                "No nearest framework among {} remaining candidates",
                remaining.len()
            );
            break;
        };

        let before = remaining.len();
        remaining.retain(|candidate| !candidate.same_name(&nearest));
        if remaining.len() == before {
            // nearest is always one of the remaining candidates
            break;
        }
        ordered.push(nearest);
    }

    Ok(ordered)
}
