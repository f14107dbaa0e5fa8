//! Framework reducer: nearest compatible framework selection

use std::cmp::Ordering;

use crate::engine::modern::compat::is_compatible;
use crate::engine::modern::framework::NuGetFramework;

/// Drop every framework that another framework in the set supersedes
/// (it can consume the other but not the reverse).
pub fn reduce_upwards(frameworks: &[NuGetFramework]) -> Vec<NuGetFramework> {
    frameworks
        .iter()
        .filter(|candidate| {
            !frameworks.iter().any(|other| {
                other != *candidate
                    && is_compatible(other, candidate)
                    && !is_compatible(candidate, other)
            })
        })
        .cloned()
        .collect()
}

fn tie_break(a: &NuGetFramework, b: &NuGetFramework) -> Ordering {
    a.version()
        .cmp(&b.version())
        .then_with(|| {
            b.portable_frameworks()
                .len()
                .cmp(&a.portable_frameworks().len())
        })
        .then_with(|| {
            b.dotnet_framework_name()
                .cmp(&a.dotnet_framework_name())
        })
}

/// Nearest framework in `candidates` that `project` can consume, or None when
/// none is compatible. The result is always one of `candidates`.
pub fn get_nearest(project: &NuGetFramework, candidates: &[NuGetFramework]) -> Option<NuGetFramework> {
    let mut compatible: Vec<NuGetFramework> = Vec::new();
    for candidate in candidates {
        if is_compatible(project, candidate) && !compatible.contains(candidate) {
            compatible.push(candidate.clone());
        }
    }

    if compatible.is_empty() {
        return None;
    }

    if let Some(exact) = compatible.iter().find(|c| *c == project) {
        return Some(exact.clone());
    }

    let non_portable: Vec<NuGetFramework> = compatible
        .iter()
        .filter(|c| !c.is_portable())
        .cloned()
        .collect();
    let pool = if non_portable.is_empty() {
        compatible
    } else {
        non_portable
    };

    let reduced = reduce_upwards(&pool);
    let reduced = if reduced.is_empty() { pool } else { reduced };

    let same_identifier: Vec<NuGetFramework> = reduced
        .iter()
        .filter(|c| c.identifier_is(project.framework()))
        .cloned()
        .collect();
    let finalists = if same_identifier.is_empty() {
        reduced
    } else {
        same_identifier
    };

    finalists.into_iter().max_by(tie_break)
}
