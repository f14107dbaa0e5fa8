//! Best version match and version ranking
//!
//! When the release offers `FindBestMatch` its answer is authoritative. The full
//! ranking orders satisfying versions with `IsBetter`, breaking ties with
//! `Compare`; releases without `IsBetter` fall back to ascending `Compare`,
//! which is what a non-floating range prefers.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::SandboxError;
use crate::facade::{Version, VersionLogic, VersionRange, VersionRangeLogic};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRanking {
    pub best: Option<Version>,
    /// Satisfying versions, best first
    pub ranked: Vec<Version>,
    /// Versions outside the range, in input order
    pub non_satisfying: Vec<Version>,
}

/// True when `a` ranks ahead of `b`
fn ranks_ahead(
    versions: &dyn VersionLogic,
    ranges: &dyn VersionRangeLogic,
    range: &VersionRange,
    a: &Version,
    b: &Version,
) -> Result<bool, SandboxError> {
    if ranges.is_better_available() {
        if ranges.is_better(range, b, a)? {
            return Ok(true);
        }
        if ranges.is_better(range, a, b)? {
            return Ok(false);
        }
    }
    Ok(versions.compare(a, b)? == Ordering::Less)
}

/// Order `satisfying` best first. Insertion keeps equal versions in input order.
pub fn rank(
    versions: &dyn VersionLogic,
    ranges: &dyn VersionRangeLogic,
    range: &VersionRange,
    satisfying: Vec<Version>,
) -> Result<Vec<Version>, SandboxError> {
    let mut ranked: Vec<Version> = Vec::with_capacity(satisfying.len());
    for version in satisfying {
        let mut index = ranked.len();
        for (i, placed) in ranked.iter().enumerate() {
            if ranks_ahead(versions, ranges, range, &version, placed)? {
                index = i;
                break;
            }
        }
        ranked.insert(index, version);
    }
    Ok(ranked)
}

/// Best match, full ranking and the versions outside the range
pub fn find_best_match(
    versions: &dyn VersionLogic,
    ranges: &dyn VersionRangeLogic,
    range: &VersionRange,
    candidates: &[Version],
) -> Result<VersionRanking, SandboxError> {
    let mut satisfying = Vec::new();
    let mut non_satisfying = Vec::new();
    for candidate in candidates {
        if ranges.satisfies(range, candidate)? {
            satisfying.push(candidate.clone());
        } else {
            non_satisfying.push(candidate.clone());
        }
    }

    let ranked = rank(versions, ranges, range, satisfying)?;
    let best = if ranges.find_best_match_available() {
        ranges.find_best_match(range, candidates)?
    } else {
        ranked.first().cloned()
    };

    Ok(VersionRanking {
        best,
        ranked,
        non_satisfying,
    })
}
