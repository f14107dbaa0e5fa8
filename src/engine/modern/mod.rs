//! `NuGet.Frameworks` and `NuGet.Versioning` (3.x and later)
//!
//! Members are published per release: a member a release predates is simply not
//! exported, and members whose behaviour changed are exported as the variant
//! that release ships.

pub mod compat;
pub mod framework;
pub mod portable;
pub mod range;
pub mod reducer;
pub mod version;

use std::cmp::Ordering;

pub use framework::NuGetFramework;
pub use range::{FloatRange, VersionRange};
pub use version::NuGetVersion;

use crate::engine::{DottedVersion, EngineError, Export, export};
use crate::release::ReleaseId;

pub const FRAMEWORKS_ASSEMBLY: &str = "NuGet.Frameworks";
pub const VERSIONING_ASSEMBLY: &str = "NuGet.Versioning";

/// Member names, as looked up by the binder
pub mod members {
    pub const FRAMEWORK_PARSE: &str = "NuGetFramework.Parse";
    pub const FRAMEWORK_SHORT_FOLDER_NAME: &str = "NuGetFramework.GetShortFolderName";
    pub const FRAMEWORK_DOTNET_NAME: &str = "NuGetFramework.DotNetFrameworkName";
    pub const FRAMEWORK_TO_STRING: &str = "NuGetFramework.ToString";
    pub const FRAMEWORK_PLATFORM: &str = "NuGetFramework.Platform";
    pub const IS_COMPATIBLE: &str = "CompatibilityProvider.IsCompatible";
    pub const GET_NEAREST: &str = "FrameworkReducer.GetNearest";
    pub const EXPAND: &str = "FrameworkExpander.Expand";
    pub const COMMON_FRAMEWORKS: &str = "FrameworkConstants.CommonFrameworks";
    pub const COMPATIBILITY_MAPPINGS: &str = "DefaultFrameworkMappings.CompatibilityMappings";
    pub const PORTABLE_PROFILES: &str = "DefaultPortableFrameworkMappings.ProfileFrameworks";

    pub const VERSION_PARSE: &str = "NuGetVersion.Parse";
    pub const VERSION_COMPARE: &str = "VersionComparer.Compare";
    pub const VERSION_NORMALIZED_STRING: &str = "NuGetVersion.ToNormalizedString";
    pub const VERSION_FULL_STRING: &str = "NuGetVersion.ToFullString";
    pub const VERSION_TO_STRING: &str = "NuGetVersion.ToString";
    pub const VERSION_IS_SEMVER2: &str = "NuGetVersion.IsSemVer2";

    pub const RANGE_PARSE: &str = "VersionRange.Parse";
    pub const RANGE_SATISFIES: &str = "VersionRange.Satisfies";
    pub const RANGE_FIND_BEST_MATCH: &str = "VersionRange.FindBestMatch";
    pub const RANGE_IS_BETTER: &str = "VersionRange.IsBetter";
    pub const RANGE_IS_FLOATING: &str = "VersionRange.IsFloating";
    pub const RANGE_NORMALIZED_STRING: &str = "VersionRange.ToNormalizedString";
    pub const RANGE_TO_STRING: &str = "VersionRange.ToString";
    pub const RANGE_PRETTY_PRINT: &str = "VersionRange.PrettyPrint";
    pub const RANGE_LEGACY_STRING: &str = "VersionRange.ToLegacyString";
    pub const RANGE_LEGACY_SHORT_STRING: &str = "VersionRange.ToLegacyShortString";
    pub const RANGE_ORIGINAL_STRING: &str = "VersionRange.OriginalString";
}

pub type ParseFrameworkFn = fn(&str) -> Result<NuGetFramework, EngineError>;
pub type FrameworkStringFn = fn(&NuGetFramework) -> String;
pub type FrameworkPlatformFn = fn(&NuGetFramework) -> (String, DottedVersion);
pub type IsCompatibleFn = fn(&NuGetFramework, &NuGetFramework) -> bool;
pub type GetNearestFn = fn(&NuGetFramework, &[NuGetFramework]) -> Option<NuGetFramework>;
pub type ExpandFn = fn(&NuGetFramework) -> Vec<NuGetFramework>;
pub type FrameworkListFn = fn() -> Vec<NuGetFramework>;

pub type ParseVersionFn = fn(&str) -> Result<NuGetVersion, EngineError>;
pub type CompareVersionFn = fn(&NuGetVersion, &NuGetVersion) -> Ordering;
pub type VersionStringFn = fn(&NuGetVersion) -> String;
pub type VersionFlagFn = fn(&NuGetVersion) -> bool;

pub type ParseRangeFn = fn(&str) -> Result<VersionRange, EngineError>;
pub type SatisfiesFn = fn(&VersionRange, &NuGetVersion) -> bool;
pub type FindBestMatchFn = fn(&VersionRange, &[NuGetVersion]) -> Option<NuGetVersion>;
pub type IsBetterFn = fn(&VersionRange, &NuGetVersion, &NuGetVersion) -> bool;
pub type RangeFlagFn = fn(&VersionRange) -> bool;
pub type RangeStringFn = fn(&VersionRange) -> String;
pub type RangeOptionalStringFn = fn(&VersionRange) -> Option<String>;

/// Members of `assembly` as shipped in `release`; None for an assembly this
/// generation does not contain
pub fn exports(assembly: &str, release: &ReleaseId) -> Option<Vec<Export>> {
    match assembly {
        FRAMEWORKS_ASSEMBLY => Some(frameworks_exports(release)),
        VERSIONING_ASSEMBLY => Some(versioning_exports(release)),
        _ => None,
    }
}

fn frameworks_exports(release: &ReleaseId) -> Vec<Export> {
    use members::*;

    let mut exports = vec![
        export::<FrameworkStringFn>(FRAMEWORK_DOTNET_NAME, framework::dotnet_framework_name),
        export::<FrameworkStringFn>(FRAMEWORK_TO_STRING, framework::to_string),
        export::<IsCompatibleFn>(IS_COMPATIBLE, compat::is_compatible),
        export::<GetNearestFn>(GET_NEAREST, reducer::get_nearest),
        export::<ExpandFn>(EXPAND, compat::expand),
        export::<FrameworkListFn>(COMPATIBILITY_MAPPINGS, compat::mapping_frameworks),
        export::<FrameworkListFn>(PORTABLE_PROFILES, compat::portable_profile_frameworks),
    ];

    if release.at_least(5, 8, 0) {
        exports.extend([
            export::<ParseFrameworkFn>(FRAMEWORK_PARSE, framework::parse_with_platforms),
            export::<FrameworkStringFn>(
                FRAMEWORK_SHORT_FOLDER_NAME,
                framework::short_folder_name_with_platforms,
            ),
            export::<FrameworkPlatformFn>(FRAMEWORK_PLATFORM, framework::platform),
            export::<FrameworkListFn>(COMMON_FRAMEWORKS, compat::common_frameworks_with_net5),
        ]);
    } else {
        exports.extend([
            export::<ParseFrameworkFn>(FRAMEWORK_PARSE, framework::parse),
            export::<FrameworkStringFn>(FRAMEWORK_SHORT_FOLDER_NAME, framework::short_folder_name),
            export::<FrameworkListFn>(COMMON_FRAMEWORKS, compat::common_frameworks),
        ]);
    }

    exports
}

fn versioning_exports(release: &ReleaseId) -> Vec<Export> {
    use members::*;

    let mut exports = vec![
        export::<ParseVersionFn>(VERSION_PARSE, version::parse),
        export::<CompareVersionFn>(VERSION_COMPARE, version::compare),
        export::<VersionStringFn>(VERSION_NORMALIZED_STRING, version::to_normalized_string),
        export::<VersionStringFn>(VERSION_TO_STRING, version::to_string),
        export::<ParseRangeFn>(RANGE_PARSE, range::parse),
        export::<SatisfiesFn>(RANGE_SATISFIES, range::satisfies),
        export::<FindBestMatchFn>(RANGE_FIND_BEST_MATCH, range::find_best_match),
        export::<RangeFlagFn>(RANGE_IS_FLOATING, range::is_floating),
        export::<RangeStringFn>(RANGE_NORMALIZED_STRING, range::to_normalized_string),
        export::<RangeStringFn>(RANGE_TO_STRING, range::to_string),
        export::<RangeStringFn>(RANGE_PRETTY_PRINT, range::pretty_print),
        export::<RangeStringFn>(RANGE_LEGACY_STRING, range::to_legacy_string),
    ];

    if release.at_least(3, 5, 0) {
        exports.extend([
            export::<VersionStringFn>(VERSION_FULL_STRING, version::to_full_string),
            export::<IsBetterFn>(RANGE_IS_BETTER, range::is_better),
            export::<RangeStringFn>(RANGE_LEGACY_SHORT_STRING, range::to_legacy_short_string),
        ]);
    }
    if release.at_least(4, 0, 0) {
        exports.push(export::<RangeOptionalStringFn>(
            RANGE_ORIGINAL_STRING,
            range::original_string,
        ));
    }
    if release.at_least(4, 3, 0) {
        exports.push(export::<VersionFlagFn>(VERSION_IS_SEMVER2, version::is_semver2));
    }

    exports
}
