//! Reflective binding for the 3.x+ lines
//!
//! Members are looked up by name and signature once, when the adapters are
//! bound. A member the release lacks leaves its slot empty: the matching
//! capability flag reads false, and calling it anyway is `Unsupported`.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::binding::members::{lookup, module, position_of, require, unwrap, unwrap_all};
use crate::engine::modern::members::*;
use crate::engine::modern::{
    CompareVersionFn, ExpandFn, FRAMEWORKS_ASSEMBLY, FindBestMatchFn, FrameworkListFn,
    FrameworkPlatformFn, FrameworkStringFn, GetNearestFn, IsBetterFn, IsCompatibleFn,
    NuGetFramework, NuGetVersion, ParseFrameworkFn, ParseRangeFn, ParseVersionFn, RangeFlagFn,
    RangeOptionalStringFn, RangeStringFn, SatisfiesFn, VERSIONING_ASSEMBLY, VersionFlagFn,
    VersionRange as EngineRange, VersionStringFn,
};
use crate::error::{EntityKind, ParseError, SandboxError};
use crate::facade::entity::{Framework, Origin, Version, VersionRange};
use crate::facade::logic::{FrameworkLogic, FrameworkSource, VersionLogic, VersionRangeLogic};
use crate::isolation::{ContextId, IsolationContext};
use crate::release::ReleaseId;

/// Members of `NuGet.Frameworks`
#[derive(Debug, Clone)]
struct FrameworkMembers {
    parse: Option<ParseFrameworkFn>,
    short_folder_name: Option<FrameworkStringFn>,
    dotnet_name: Option<FrameworkStringFn>,
    to_string: Option<FrameworkStringFn>,
    platform: Option<FrameworkPlatformFn>,
    is_compatible: Option<IsCompatibleFn>,
    get_nearest: Option<GetNearestFn>,
    expand: Option<ExpandFn>,
    common: Option<FrameworkListFn>,
    mappings: Option<FrameworkListFn>,
    portable: Option<FrameworkListFn>,
}

/// Members of `NuGet.Versioning`
#[derive(Debug, Clone)]
struct VersioningMembers {
    parse: Option<ParseVersionFn>,
    compare: Option<CompareVersionFn>,
    normalized_string: Option<VersionStringFn>,
    full_string: Option<VersionStringFn>,
    to_string: Option<VersionStringFn>,
    is_semver2: Option<VersionFlagFn>,
    parse_range: Option<ParseRangeFn>,
    satisfies: Option<SatisfiesFn>,
    find_best_match: Option<FindBestMatchFn>,
    is_better: Option<IsBetterFn>,
    is_floating: Option<RangeFlagFn>,
    range_normalized_string: Option<RangeStringFn>,
    range_pretty_print: Option<RangeStringFn>,
    range_legacy_string: Option<RangeStringFn>,
    range_legacy_short_string: Option<RangeStringFn>,
    range_original_string: Option<RangeOptionalStringFn>,
}

/// Members of one context, resolved once and shared by the three adapters
#[derive(Debug, Clone)]
pub struct ModernBinding {
    origin: Origin,
    frameworks: Arc<FrameworkMembers>,
    versioning: Arc<VersioningMembers>,
}

impl ModernBinding {
    pub fn bind(context: &IsolationContext) -> Result<Self, SandboxError> {
        let frameworks = module(context, FRAMEWORKS_ASSEMBLY)?;
        let versioning = module(context, VERSIONING_ASSEMBLY)?;

        let framework_members = FrameworkMembers {
            parse: lookup(frameworks, FRAMEWORK_PARSE),
            short_folder_name: lookup(frameworks, FRAMEWORK_SHORT_FOLDER_NAME),
            dotnet_name: lookup(frameworks, FRAMEWORK_DOTNET_NAME),
            to_string: lookup(frameworks, FRAMEWORK_TO_STRING),
            platform: lookup(frameworks, FRAMEWORK_PLATFORM),
            is_compatible: lookup(frameworks, IS_COMPATIBLE),
            get_nearest: lookup(frameworks, GET_NEAREST),
            expand: lookup(frameworks, EXPAND),
            common: lookup(frameworks, COMMON_FRAMEWORKS),
            mappings: lookup(frameworks, COMPATIBILITY_MAPPINGS),
            portable: lookup(frameworks, PORTABLE_PROFILES),
        };

        let versioning_members = VersioningMembers {
            parse: lookup(versioning, VERSION_PARSE),
            compare: lookup(versioning, VERSION_COMPARE),
            normalized_string: lookup(versioning, VERSION_NORMALIZED_STRING),
            full_string: lookup(versioning, VERSION_FULL_STRING),
            to_string: lookup(versioning, VERSION_TO_STRING),
            is_semver2: lookup(versioning, VERSION_IS_SEMVER2),
            parse_range: lookup(versioning, RANGE_PARSE),
            satisfies: lookup(versioning, RANGE_SATISFIES),
            find_best_match: lookup(versioning, RANGE_FIND_BEST_MATCH),
            is_better: lookup(versioning, RANGE_IS_BETTER),
            is_floating: lookup(versioning, RANGE_IS_FLOATING),
            range_normalized_string: lookup(versioning, RANGE_NORMALIZED_STRING),
            range_pretty_print: lookup(versioning, RANGE_PRETTY_PRINT),
            range_legacy_string: lookup(versioning, RANGE_LEGACY_STRING),
            range_legacy_short_string: lookup(versioning, RANGE_LEGACY_SHORT_STRING),
            range_original_string: lookup(versioning, RANGE_ORIGINAL_STRING),
        };
        debug!("Bound {} and {} for {}", FRAMEWORKS_ASSEMBLY, VERSIONING_ASSEMBLY, context.release());

        Ok(Self {
            origin: Origin {
                context: context.id(),
                release: context.release().clone(),
            },
            frameworks: Arc::new(framework_members),
            versioning: Arc::new(versioning_members),
        })
    }

    pub fn framework_logic(&self) -> Arc<dyn FrameworkLogic> {
        Arc::new(ModernFrameworkLogic(self.clone()))
    }

    pub fn version_logic(&self) -> Arc<dyn VersionLogic> {
        Arc::new(ModernVersionLogic(self.clone()))
    }

    pub fn range_logic(&self) -> Arc<dyn VersionRangeLogic> {
        Arc::new(ModernVersionRangeLogic(self.clone()))
    }

    fn release(&self) -> &ReleaseId {
        &self.origin.release
    }

    fn wrap_framework(&self, framework: NuGetFramework) -> Result<Framework, SandboxError> {
        let members = &self.frameworks;
        let short_folder_name = require(members.short_folder_name, self.release(), FRAMEWORK_SHORT_FOLDER_NAME)?;
        let dotnet_name = require(members.dotnet_name, self.release(), FRAMEWORK_DOTNET_NAME)?;
        let to_string = require(members.to_string, self.release(), FRAMEWORK_TO_STRING)?;
        let (platform, platform_version) = match members.platform {
            Some(platform) => {
                let (name, version) = platform(&framework);
                (Some(name), Some(version))
            }
            None => (None, None),
        };

        Ok(Framework {
            origin: self.origin.clone(),
            identifier: framework.framework().to_string(),
            version: framework.version(),
            profile: framework.profile().to_string(),
            has_profile: framework.has_profile(),
            short_folder_name: short_folder_name(&framework),
            dotnet_framework_name: dotnet_name(&framework),
            has_platform: framework.has_platform(),
            platform,
            platform_version,
            to_string_result: to_string(&framework),
            inner: Arc::new(framework),
        })
    }

    fn wrap_frameworks(&self, frameworks: Vec<NuGetFramework>) -> Result<Vec<Framework>, SandboxError> {
        frameworks
            .into_iter()
            .map(|framework| self.wrap_framework(framework))
            .collect()
    }

    fn wrap_version(&self, version: NuGetVersion) -> Result<Version, SandboxError> {
        let members = &self.versioning;
        let normalized = require(members.normalized_string, self.release(), VERSION_NORMALIZED_STRING)?;
        let to_string = require(members.to_string, self.release(), VERSION_TO_STRING)?;

        Ok(Version {
            origin: self.origin.clone(),
            major: version.major(),
            minor: version.minor(),
            patch: version.patch(),
            revision: version.revision(),
            is_prerelease: version.is_prerelease(),
            normalized_string: normalized(&version),
            full_string: members.full_string.map(|full_string| full_string(&version)),
            is_semver2: members.is_semver2.map(|is_semver2| is_semver2(&version)),
            to_string_result: to_string(&version),
            inner: Arc::new(version),
        })
    }

    fn wrap_range(&self, range: EngineRange) -> Result<VersionRange, SandboxError> {
        let members = &self.versioning;
        let normalized = require(members.range_normalized_string, self.release(), RANGE_NORMALIZED_STRING)?;
        let pretty_print = require(members.range_pretty_print, self.release(), RANGE_PRETTY_PRINT)?;

        let min_version = range
            .min_version()
            .cloned()
            .map(|v| self.wrap_version(v))
            .transpose()?;
        let max_version = range
            .max_version()
            .cloned()
            .map(|v| self.wrap_version(v))
            .transpose()?;

        Ok(VersionRange {
            origin: self.origin.clone(),
            has_lower_bound: range.has_lower_bound(),
            has_upper_bound: range.has_upper_bound(),
            is_min_inclusive: range.is_min_inclusive(),
            is_max_inclusive: range.is_max_inclusive(),
            is_floating: members.is_floating.map(|is_floating| is_floating(&range)),
            min_version,
            max_version,
            normalized_string: normalized(&range),
            pretty_print: pretty_print(&range),
            legacy_short_string: members.range_legacy_short_string.map(|f| f(&range)),
            legacy_string: members.range_legacy_string.map(|f| f(&range)),
            original_string: members.range_original_string.map(|f| f(&range)),
            inner: Arc::new(range),
        })
    }
}

struct ModernFrameworkLogic(ModernBinding);

impl FrameworkLogic for ModernFrameworkLogic {
    fn context(&self) -> ContextId {
        self.0.origin.context
    }

    fn release(&self) -> &ReleaseId {
        self.0.release()
    }

    fn parse(&self, input: &str) -> Result<Framework, SandboxError> {
        let parse = require(self.0.frameworks.parse, self.release(), FRAMEWORK_PARSE)?;
        let framework = parse(input).map_err(|e| ParseError::new(EntityKind::Framework, input, e.0))?;
        self.0.wrap_framework(framework)
    }

    fn is_compatible(&self, project: &Framework, package: &Framework) -> Result<bool, SandboxError> {
        let is_compatible = require(self.0.frameworks.is_compatible, self.release(), IS_COMPATIBLE)?;
        let project = unwrap::<NuGetFramework, _>(self.context(), project)?;
        let package = unwrap::<NuGetFramework, _>(self.context(), package)?;
        Ok(is_compatible(project, package))
    }

    fn get_nearest(
        &self,
        project: &Framework,
        candidates: &[Framework],
    ) -> Result<Option<Framework>, SandboxError> {
        let get_nearest = require(self.0.frameworks.get_nearest, self.release(), GET_NEAREST)?;
        let project_value = unwrap::<NuGetFramework, _>(self.context(), project)?;
        let values = unwrap_all::<NuGetFramework, _>(self.context(), candidates)?;

        Ok(get_nearest(project_value, &values)
            .and_then(|nearest| position_of(&values, &nearest))
            .map(|index| candidates[index].clone()))
    }

    fn expand_available(&self) -> bool {
        self.0.frameworks.expand.is_some()
    }

    fn expand(&self, framework: &Framework) -> Result<Vec<Framework>, SandboxError> {
        let expand = require(self.0.frameworks.expand, self.release(), EXPAND)?;
        let framework = unwrap::<NuGetFramework, _>(self.context(), framework)?;
        self.0.wrap_frameworks(expand(framework))
    }

    fn source_available(&self, source: FrameworkSource) -> bool {
        let members = &self.0.frameworks;
        match source {
            FrameworkSource::Common => members.common.is_some(),
            FrameworkSource::CompatibilityMappings => members.mappings.is_some(),
            FrameworkSource::PortableProfiles => members.portable.is_some(),
        }
    }

    fn frameworks(&self, source: FrameworkSource) -> Result<Vec<Framework>, SandboxError> {
        let members = &self.0.frameworks;
        let list = match source {
            FrameworkSource::Common => require(members.common, self.release(), COMMON_FRAMEWORKS)?,
            FrameworkSource::CompatibilityMappings => {
                require(members.mappings, self.release(), COMPATIBILITY_MAPPINGS)?
            }
            FrameworkSource::PortableProfiles => {
                require(members.portable, self.release(), PORTABLE_PROFILES)?
            }
        };
        self.0.wrap_frameworks(list())
    }
}

struct ModernVersionLogic(ModernBinding);

impl VersionLogic for ModernVersionLogic {
    fn context(&self) -> ContextId {
        self.0.origin.context
    }

    fn release(&self) -> &ReleaseId {
        self.0.release()
    }

    fn parse(&self, input: &str) -> Result<Version, SandboxError> {
        let parse = require(self.0.versioning.parse, self.release(), VERSION_PARSE)?;
        let version = parse(input).map_err(|e| ParseError::new(EntityKind::Version, input, e.0))?;
        self.0.wrap_version(version)
    }

    fn compare(&self, a: &Version, b: &Version) -> Result<Ordering, SandboxError> {
        let compare = require(self.0.versioning.compare, self.release(), VERSION_COMPARE)?;
        let a = unwrap::<NuGetVersion, _>(self.context(), a)?;
        let b = unwrap::<NuGetVersion, _>(self.context(), b)?;
        Ok(compare(a, b))
    }

    fn full_string_available(&self) -> bool {
        self.0.versioning.full_string.is_some()
    }

    fn is_semver2_available(&self) -> bool {
        self.0.versioning.is_semver2.is_some()
    }
}

struct ModernVersionRangeLogic(ModernBinding);

impl VersionRangeLogic for ModernVersionRangeLogic {
    fn context(&self) -> ContextId {
        self.0.origin.context
    }

    fn release(&self) -> &ReleaseId {
        self.0.release()
    }

    fn parse(&self, input: &str) -> Result<VersionRange, SandboxError> {
        let parse = require(self.0.versioning.parse_range, self.release(), RANGE_PARSE)?;
        let range = parse(input).map_err(|e| ParseError::new(EntityKind::VersionRange, input, e.0))?;
        self.0.wrap_range(range)
    }

    fn satisfies(&self, range: &VersionRange, version: &Version) -> Result<bool, SandboxError> {
        let satisfies = require(self.0.versioning.satisfies, self.release(), RANGE_SATISFIES)?;
        let range = unwrap::<EngineRange, _>(self.context(), range)?;
        let version = unwrap::<NuGetVersion, _>(self.context(), version)?;
        Ok(satisfies(range, version))
    }

    fn find_best_match_available(&self) -> bool {
        self.0.versioning.find_best_match.is_some()
    }

    fn find_best_match(
        &self,
        range: &VersionRange,
        candidates: &[Version],
    ) -> Result<Option<Version>, SandboxError> {
        let find_best_match =
            require(self.0.versioning.find_best_match, self.release(), RANGE_FIND_BEST_MATCH)?;
        let range = unwrap::<EngineRange, _>(self.context(), range)?;
        let values = unwrap_all::<NuGetVersion, _>(self.context(), candidates)?;

        Ok(find_best_match(range, &values)
            .and_then(|best| position_of(&values, &best))
            .map(|index| candidates[index].clone()))
    }

    fn is_better_available(&self) -> bool {
        self.0.versioning.is_better.is_some()
    }

    fn is_better(
        &self,
        range: &VersionRange,
        current: &Version,
        considering: &Version,
    ) -> Result<bool, SandboxError> {
        let is_better = require(self.0.versioning.is_better, self.release(), RANGE_IS_BETTER)?;
        let range = unwrap::<EngineRange, _>(self.context(), range)?;
        let current = unwrap::<NuGetVersion, _>(self.context(), current)?;
        let considering = unwrap::<NuGetVersion, _>(self.context(), considering)?;
        Ok(is_better(range, current, considering))
    }

    fn is_floating_available(&self) -> bool {
        self.0.versioning.is_floating.is_some()
    }

    fn legacy_short_string_available(&self) -> bool {
        self.0.versioning.range_legacy_short_string.is_some()
    }

    fn original_string_available(&self) -> bool {
        self.0.versioning.range_original_string.is_some()
    }
}
