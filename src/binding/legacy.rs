//! Typed binding for the 2.x line
//!
//! `NuGet.Core` publishes a single [`CoreApi`] entry point whose shape is fixed,
//! so the adapters call it directly instead of resolving members one by one.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::binding::members::{lookup, module, unwrap, unwrap_all};
use crate::engine::legacy::{CORE_ASSEMBLY, CoreApi, FrameworkName, SemanticVersion, VERSION_UTILITY, VersionSpec};
use crate::error::{EntityKind, ParseError, SandboxError};
use crate::facade::entity::{Framework, Origin, Version, VersionRange};
use crate::facade::logic::{FrameworkLogic, FrameworkSource, VersionLogic, VersionRangeLogic};
use crate::isolation::{ContextId, IsolationContext};
use crate::release::ReleaseId;

/// `CoreApi` of one context, shared by the three adapters
#[derive(Debug, Clone)]
pub struct LegacyBinding {
    origin: Origin,
    api: CoreApi,
}

impl LegacyBinding {
    pub fn bind(context: &IsolationContext) -> Result<Self, SandboxError> {
        let core = module(context, CORE_ASSEMBLY)?;
        let api = lookup::<CoreApi>(core, VERSION_UTILITY).ok_or_else(|| SandboxError::Unsupported {
            release: context.release().clone(),
            capability: VERSION_UTILITY,
        })?;
        debug!("Bound {} for {}", VERSION_UTILITY, context.release());

        Ok(Self {
            origin: Origin {
                context: context.id(),
                release: context.release().clone(),
            },
            api,
        })
    }

    pub fn framework_logic(&self) -> Arc<dyn FrameworkLogic> {
        Arc::new(LegacyFrameworkLogic(self.clone()))
    }

    pub fn version_logic(&self) -> Arc<dyn VersionLogic> {
        Arc::new(LegacyVersionLogic(self.clone()))
    }

    pub fn range_logic(&self) -> Arc<dyn VersionRangeLogic> {
        Arc::new(LegacyVersionRangeLogic(self.clone()))
    }

    fn unsupported(&self, capability: &'static str) -> SandboxError {
        SandboxError::Unsupported {
            release: self.origin.release.clone(),
            capability,
        }
    }

    fn wrap_framework(&self, framework: FrameworkName) -> Framework {
        Framework {
            origin: self.origin.clone(),
            identifier: framework.identifier().to_string(),
            version: framework.version(),
            profile: framework.profile().to_string(),
            has_profile: !framework.profile().is_empty(),
            short_folder_name: self.api.short_framework_name(&framework),
            dotnet_framework_name: framework.full_name(),
            has_platform: false,
            platform: None,
            platform_version: None,
            to_string_result: framework.to_string(),
            inner: Arc::new(framework),
        }
    }

    fn wrap_version(&self, version: SemanticVersion) -> Version {
        let [major, minor, patch, revision] = version.version().parts().map(u64::from);
        Version {
            origin: self.origin.clone(),
            major,
            minor,
            patch,
            revision,
            is_prerelease: version.is_prerelease(),
            normalized_string: version.to_normalized_string(),
            full_string: None,
            is_semver2: None,
            to_string_result: version.to_string(),
            inner: Arc::new(version),
        }
    }

    fn wrap_range(&self, spec: VersionSpec) -> VersionRange {
        VersionRange {
            origin: self.origin.clone(),
            has_lower_bound: spec.min.is_some(),
            has_upper_bound: spec.max.is_some(),
            is_min_inclusive: spec.min_inclusive,
            is_max_inclusive: spec.max_inclusive,
            is_floating: None,
            min_version: spec.min.clone().map(|v| self.wrap_version(v)),
            max_version: spec.max.clone().map(|v| self.wrap_version(v)),
            normalized_string: spec.to_normalized_string(),
            pretty_print: self.api.pretty_print(&spec),
            legacy_short_string: None,
            legacy_string: Some(spec.to_string()),
            original_string: None,
            inner: Arc::new(spec),
        }
    }
}

struct LegacyFrameworkLogic(LegacyBinding);

impl FrameworkLogic for LegacyFrameworkLogic {
    fn context(&self) -> ContextId {
        self.0.origin.context
    }

    fn release(&self) -> &ReleaseId {
        &self.0.origin.release
    }

    fn parse(&self, input: &str) -> Result<Framework, SandboxError> {
        let framework = self
            .0
            .api
            .parse_framework(input)
            .map_err(|e| ParseError::new(EntityKind::Framework, input, e.0))?;
        Ok(self.0.wrap_framework(framework))
    }

    fn is_compatible(&self, project: &Framework, package: &Framework) -> Result<bool, SandboxError> {
        let project = unwrap::<FrameworkName, _>(self.context(), project)?;
        let package = unwrap::<FrameworkName, _>(self.context(), package)?;
        Ok(self.0.api.is_compatible(project, package))
    }

    fn get_nearest(
        &self,
        project: &Framework,
        candidates: &[Framework],
    ) -> Result<Option<Framework>, SandboxError> {
        let project_value = unwrap::<FrameworkName, _>(self.context(), project)?;
        let values = unwrap_all::<FrameworkName, _>(self.context(), candidates)?;

        let nearest = self.0.api.get_nearest(project_value, &values);
        Ok(nearest
            .and_then(|nearest| values.iter().position(|value| *value == nearest))
            .map(|index| candidates[index].clone()))
    }

    fn expand_available(&self) -> bool {
        false
    }

    fn expand(&self, _framework: &Framework) -> Result<Vec<Framework>, SandboxError> {
        Err(self.0.unsupported("Expand"))
    }

    fn source_available(&self, source: FrameworkSource) -> bool {
        source == FrameworkSource::Common
    }

    fn frameworks(&self, source: FrameworkSource) -> Result<Vec<Framework>, SandboxError> {
        match source {
            FrameworkSource::Common => Ok(self
                .0
                .api
                .known_frameworks()
                .into_iter()
                .map(|framework| self.0.wrap_framework(framework))
                .collect()),
            FrameworkSource::CompatibilityMappings => Err(self.0.unsupported("CompatibilityMappings")),
            FrameworkSource::PortableProfiles => Err(self.0.unsupported("PortableProfiles")),
        }
    }
}

struct LegacyVersionLogic(LegacyBinding);

impl VersionLogic for LegacyVersionLogic {
    fn context(&self) -> ContextId {
        self.0.origin.context
    }

    fn release(&self) -> &ReleaseId {
        &self.0.origin.release
    }

    fn parse(&self, input: &str) -> Result<Version, SandboxError> {
        let version = self
            .0
            .api
            .parse_version(input)
            .map_err(|e| ParseError::new(EntityKind::Version, input, e.0))?;
        Ok(self.0.wrap_version(version))
    }

    fn compare(&self, a: &Version, b: &Version) -> Result<Ordering, SandboxError> {
        let a = unwrap::<SemanticVersion, _>(self.context(), a)?;
        let b = unwrap::<SemanticVersion, _>(self.context(), b)?;
        Ok(self.0.api.compare(a, b))
    }

    fn full_string_available(&self) -> bool {
        false
    }

    fn is_semver2_available(&self) -> bool {
        false
    }
}

struct LegacyVersionRangeLogic(LegacyBinding);

impl VersionRangeLogic for LegacyVersionRangeLogic {
    fn context(&self) -> ContextId {
        self.0.origin.context
    }

    fn release(&self) -> &ReleaseId {
        &self.0.origin.release
    }

    fn parse(&self, input: &str) -> Result<VersionRange, SandboxError> {
        let spec = self
            .0
            .api
            .parse_version_spec(input)
            .map_err(|e| ParseError::new(EntityKind::VersionRange, input, e.0))?;
        Ok(self.0.wrap_range(spec))
    }

    fn satisfies(&self, range: &VersionRange, version: &Version) -> Result<bool, SandboxError> {
        let spec = unwrap::<VersionSpec, _>(self.context(), range)?;
        let version = unwrap::<SemanticVersion, _>(self.context(), version)?;
        Ok(self.0.api.satisfies(spec, version))
    }

    fn find_best_match_available(&self) -> bool {
        false
    }

    fn find_best_match(
        &self,
        _range: &VersionRange,
        _candidates: &[Version],
    ) -> Result<Option<Version>, SandboxError> {
        Err(self.0.unsupported("FindBestMatch"))
    }

    fn is_better_available(&self) -> bool {
        false
    }

    fn is_better(
        &self,
        _range: &VersionRange,
        _current: &Version,
        _considering: &Version,
    ) -> Result<bool, SandboxError> {
        Err(self.0.unsupported("IsBetter"))
    }

    fn is_floating_available(&self) -> bool {
        false
    }

    fn legacy_short_string_available(&self) -> bool {
        false
    }

    fn original_string_available(&self) -> bool {
        false
    }
}
