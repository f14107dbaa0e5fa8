//! Logic adapter contracts
//!
//! An adapter is bound to one isolation context. It only accepts entities that
//! context produced: anything else is [`SandboxError::ContextMismatch`].
//! Optional operations come with an `*_available` flag that callers check
//! first; calling an unavailable operation is [`SandboxError::Unsupported`].

use std::cmp::Ordering;

use crate::error::SandboxError;
use crate::facade::entity::{Framework, Version, VersionRange};
use crate::isolation::ContextId;
use crate::release::ReleaseId;

/// Framework tables a release can publish for catalog building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameworkSource {
    /// Well known framework constants
    Common,
    /// Both ends of every compatibility mapping
    CompatibilityMappings,
    /// Members of every portable profile
    PortableProfiles,
}

impl FrameworkSource {
    pub fn all() -> [FrameworkSource; 3] {
        [
            FrameworkSource::Common,
            FrameworkSource::CompatibilityMappings,
            FrameworkSource::PortableProfiles,
        ]
    }
}

pub trait FrameworkLogic: Send + Sync {
    fn context(&self) -> ContextId;

    fn release(&self) -> &ReleaseId;

    /// Parse a short folder name or a `.NET` framework name
    fn parse(&self, input: &str) -> Result<Framework, SandboxError>;

    fn is_compatible(&self, project: &Framework, package: &Framework) -> Result<bool, SandboxError>;

    /// Nearest compatible candidate; None when no candidate is compatible
    fn get_nearest(
        &self,
        project: &Framework,
        candidates: &[Framework],
    ) -> Result<Option<Framework>, SandboxError>;

    fn expand_available(&self) -> bool;

    /// Frameworks `framework` is equivalent to or can consume
    fn expand(&self, framework: &Framework) -> Result<Vec<Framework>, SandboxError>;

    fn source_available(&self, source: FrameworkSource) -> bool;

    fn frameworks(&self, source: FrameworkSource) -> Result<Vec<Framework>, SandboxError>;
}

pub trait VersionLogic: Send + Sync {
    fn context(&self) -> ContextId;

    fn release(&self) -> &ReleaseId;

    fn parse(&self, input: &str) -> Result<Version, SandboxError>;

    fn compare(&self, a: &Version, b: &Version) -> Result<Ordering, SandboxError>;

    fn full_string_available(&self) -> bool;

    fn is_semver2_available(&self) -> bool;
}

pub trait VersionRangeLogic: Send + Sync {
    fn context(&self) -> ContextId;

    fn release(&self) -> &ReleaseId;

    fn parse(&self, input: &str) -> Result<VersionRange, SandboxError>;

    fn satisfies(&self, range: &VersionRange, version: &Version) -> Result<bool, SandboxError>;

    fn find_best_match_available(&self) -> bool;

    /// Best candidate as the release computes it; None when none satisfies
    fn find_best_match(
        &self,
        range: &VersionRange,
        candidates: &[Version],
    ) -> Result<Option<Version>, SandboxError>;

    fn is_better_available(&self) -> bool;

    /// True when `considering` should replace `current` as the best match
    fn is_better(
        &self,
        range: &VersionRange,
        current: &Version,
        considering: &Version,
    ) -> Result<bool, SandboxError>;

    fn is_floating_available(&self) -> bool;

    fn legacy_short_string_available(&self) -> bool;

    fn original_string_available(&self) -> bool;
}
