//! Member lookup and entity checks shared by both binding strategies

use std::any::Any;

use tracing::debug;

use crate::error::{BuildError, SandboxError};
use crate::facade::entity::Wrapped;
use crate::isolation::{ContextId, IsolationContext, LoadedModule};
use crate::release::ReleaseId;

/// Module of `assembly` in the context
pub(crate) fn module<'a>(
    context: &'a IsolationContext,
    assembly: &str,
) -> Result<&'a LoadedModule, SandboxError> {
    context.module(assembly).ok_or_else(|| {
        SandboxError::Build(BuildError::MissingAssembly {
            release: context.release().clone(),
            assembly: assembly.to_string(),
        })
    })
}

/// Look a member up by name and signature. A miss is not an error here: it
/// surfaces as an unavailable capability, or as `Unsupported` on first use.
pub(crate) fn lookup<T: Any + Clone>(module: &LoadedModule, name: &'static str) -> Option<T> {
    let member = module.member::<T>(name);
    if member.is_none() {
        debug!("{} has no member {}", module.assembly(), name);
    }
    member
}

/// Member resolved at bind time, or `Unsupported` for this call
pub(crate) fn require<T: Copy>(
    member: Option<T>,
    release: &ReleaseId,
    capability: &'static str,
) -> Result<T, SandboxError> {
    member.ok_or_else(|| SandboxError::Unsupported {
        release: release.clone(),
        capability,
    })
}

/// Engine value inside `entity`, provided it comes from the bound context
pub(crate) fn unwrap<T: Any, E: Wrapped>(bound: ContextId, entity: &E) -> Result<&T, SandboxError> {
    let origin = entity.origin().context;
    if origin != bound {
        return Err(SandboxError::ContextMismatch {
            expected: bound,
            actual: origin,
        });
    }
    entity
        .inner()
        .downcast_ref::<T>()
        .ok_or(SandboxError::ForeignValue(E::KIND))
}

/// Engine values of every entity in `entities`
pub(crate) fn unwrap_all<T: Any + Clone, E: Wrapped>(
    bound: ContextId,
    entities: &[E],
) -> Result<Vec<T>, SandboxError> {
    entities
        .iter()
        .map(|entity| unwrap::<T, E>(bound, entity).cloned())
        .collect()
}

/// Index of the first entity whose engine value equals `found`
pub(crate) fn position_of<T: Any + PartialEq>(values: &[T], found: &T) -> Option<usize> {
    values.iter().position(|value| value == found)
}
